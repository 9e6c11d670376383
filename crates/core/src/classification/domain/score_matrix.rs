/// A category's mean score.
#[derive(Clone, Debug, PartialEq)]
pub struct CategoryScore {
    pub category: String,
    pub score: f64,
}

/// Sorts scores descending. The sort is stable, so equal scores keep their
/// input order; callers pass catalog order to make the first declared
/// category win ties.
pub fn rank(mut scores: Vec<CategoryScore>) -> Vec<CategoryScore> {
    scores.sort_by(|a, b| b.score.total_cmp(&a.score));
    scores
}

/// Running (sum, count) of per-frame averages for each category of one
/// group. Lives for a single classification call.
#[derive(Debug, Default)]
pub struct ScoreMatrix {
    cells: Vec<(String, f64, usize)>,
}

impl ScoreMatrix {
    /// Seeds one empty cell per category, fixing catalog order up front.
    pub fn new<'a>(categories: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            cells: categories
                .into_iter()
                .map(|c| (c.to_string(), 0.0, 0))
                .collect(),
        }
    }

    pub fn add(&mut self, category: &str, value: f64) {
        match self.cells.iter_mut().find(|(name, _, _)| name == category) {
            Some((_, sum, count)) => {
                *sum += value;
                *count += 1;
            }
            None => self.cells.push((category.to_string(), value, 1)),
        }
    }

    /// Means of every category that received at least one value, best
    /// first.
    pub fn ranking(&self) -> Vec<CategoryScore> {
        rank(
            self.cells
                .iter()
                .filter(|(_, _, count)| *count > 0)
                .map(|(name, sum, count)| CategoryScore {
                    category: name.clone(),
                    score: sum / *count as f64,
                })
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn score(category: &str, score: f64) -> CategoryScore {
        CategoryScore {
            category: category.to_string(),
            score,
        }
    }

    #[test]
    fn test_rank_descending() {
        let ranked = rank(vec![score("a", 10.0), score("b", 30.0), score("c", 20.0)]);
        let names: Vec<_> = ranked.iter().map(|s| s.category.as_str()).collect();
        assert_eq!(names, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_rank_ties_keep_input_order() {
        let ranked = rank(vec![score("first", 50.0), score("second", 50.0), score("low", 1.0)]);
        assert_eq!(ranked[0].category, "first");
        assert_eq!(ranked[1].category, "second");
    }

    #[test]
    fn test_matrix_means_per_category() {
        let mut matrix = ScoreMatrix::new(["a", "b"]);
        matrix.add("a", 90.0);
        matrix.add("a", 70.0);
        matrix.add("b", 40.0);

        let ranking = matrix.ranking();
        assert_eq!(ranking[0].category, "a");
        assert_relative_eq!(ranking[0].score, 80.0);
        assert_relative_eq!(ranking[1].score, 40.0);
    }

    #[test]
    fn test_unscored_categories_excluded() {
        let mut matrix = ScoreMatrix::new(["a", "b", "c"]);
        matrix.add("b", 10.0);
        let ranking = matrix.ranking();
        assert_eq!(ranking.len(), 1);
        assert_eq!(ranking[0].category, "b");
    }

    #[test]
    fn test_seeded_order_breaks_ties() {
        let mut matrix = ScoreMatrix::new(["a", "b"]);
        matrix.add("b", 50.0);
        matrix.add("a", 50.0);
        assert_eq!(matrix.ranking()[0].category, "a");
    }

    #[test]
    fn test_empty_matrix() {
        let matrix = ScoreMatrix::new(["a"]);
        assert!(matrix.ranking().is_empty());
        assert!(ScoreMatrix::default().ranking().is_empty());
    }

    #[test]
    fn test_unseeded_category_appended() {
        let mut matrix = ScoreMatrix::default();
        matrix.add("z", 5.0);
        assert_eq!(matrix.ranking().len(), 1);
        assert_eq!(matrix.ranking()[0].category, "z");
    }
}
