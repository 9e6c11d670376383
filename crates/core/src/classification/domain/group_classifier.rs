use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;

use crate::catalog::domain::reference_catalog::{Category, ReferenceCatalog};
use crate::catalog::infrastructure::reference_cache::ReferenceCache;
use crate::classification::domain::decision::{ClassificationDecision, DecisionLog, LogEntry};
use crate::classification::domain::escalation_policy::EscalationPolicy;
use crate::classification::domain::score_matrix::{rank, CategoryScore, ScoreMatrix};
use crate::frames::domain::frame::Frame;
use crate::frames::domain::frame_grouper::FrameGroup;
use crate::oracle::domain::image_preparer::ImagePreparer;
use crate::oracle::domain::similarity_scorer::SimilarityScorer;
use crate::pipeline::batch_logger::BatchLogger;
use crate::pipeline::comparison_counter::ComparisonCounter;
use crate::shared::prepared_image::PreparedImage;

/// Shared collaborators for one classification call.
pub struct ClassifyContext<'a> {
    pub catalog: &'a ReferenceCatalog,
    pub cache: &'a ReferenceCache,
    pub counter: &'a mut ComparisonCounter,
    pub logger: &'a mut dyn BatchLogger,
}

/// Decides which category a frame group belongs to by scoring its frames
/// against reference images.
///
/// For every frame, each scoreable category is scored with its first `k`
/// references and averaged; the [`EscalationPolicy`] picks `k` and decides
/// when to stop raising it. Every category scored in a frame's final round
/// contributes that round's average to the group tally, even when the loser
/// categories were scored with fewer references than the leader. The group
/// label is the category with the best mean contribution, ties going to the
/// category declared first.
pub struct GroupClassifier {
    scorer: SimilarityScorer,
    preparer: Box<dyn ImagePreparer>,
    policy: EscalationPolicy,
}

impl GroupClassifier {
    pub fn new(
        scorer: SimilarityScorer,
        preparer: Box<dyn ImagePreparer>,
        policy: EscalationPolicy,
    ) -> Self {
        Self {
            scorer,
            preparer,
            policy,
        }
    }

    pub fn classify(
        &mut self,
        group: &FrameGroup,
        ctx: &mut ClassifyContext<'_>,
    ) -> Result<ClassificationDecision, Box<dyn std::error::Error>> {
        let catalog = ctx.catalog;
        let scoreable: Vec<&Category> = catalog.scoreable_categories().collect();
        let max_references = catalog.max_references();
        let mut log = DecisionLog::default();
        let mut matrix = ScoreMatrix::new(scoreable.iter().map(|c| c.name()));

        if scoreable.is_empty() {
            return Ok(ClassificationDecision::fallback(log));
        }

        for frame in group.frames() {
            let candidate = match self.preparer.prepare(frame.path()) {
                Ok(candidate) => candidate,
                Err(e) => {
                    log::warn!("Skipping unreadable frame {}: {e}", frame.path().display());
                    log.push(LogEntry::FrameSkipped {
                        frame: frame.file_name(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            let averages =
                self.score_frame(frame, &candidate, &scoreable, max_references, ctx, &mut log)?;
            for average in averages {
                log.push(LogEntry::Contribution {
                    category: average.category.clone(),
                    average: average.score,
                });
                matrix.add(&average.category, average.score);
            }
        }

        let ranking = matrix.ranking();
        let Some(best) = ranking.first() else {
            return Ok(ClassificationDecision::fallback(log));
        };
        let runner_up = ranking.get(1).map(|s| s.score);

        log.push(LogEntry::Final {
            best: best.category.clone(),
            best_score: best.score,
            runner_up: runner_up.unwrap_or(self.policy.lone_runner_up()),
        });

        Ok(ClassificationDecision {
            category: best.category.clone(),
            ambiguous: self.policy.is_ambiguous(best.score, runner_up),
            ranking,
            log,
        })
    }

    /// Runs a frame's escalation rounds and returns the averages of the
    /// round that ended it, best first.
    fn score_frame(
        &mut self,
        frame: &Frame,
        candidate: &PreparedImage,
        scoreable: &[&Category],
        max_references: usize,
        ctx: &mut ClassifyContext<'_>,
        log: &mut DecisionLog,
    ) -> Result<Vec<CategoryScore>, Box<dyn std::error::Error>> {
        // A round at budget k+1 reuses the scores of the first k references.
        let mut seen: HashMap<&Path, f64> = HashMap::new();
        let mut budget = self.policy.initial_budget(max_references);

        loop {
            log.push(LogEntry::RoundStarted {
                frame: frame.file_name(),
                budget,
            });

            let mut averages = Vec::with_capacity(scoreable.len());
            for category in scoreable {
                let references = category.leading_references(budget);
                let mut sum = 0.0;
                for reference in references {
                    let score = match seen.get(reference.path()) {
                        Some(score) => *score,
                        None => {
                            let score =
                                self.compare(category.name(), reference.path(), candidate, ctx, log)?;
                            seen.insert(reference.path(), score);
                            score
                        }
                    };
                    sum += score;
                }
                averages.push(CategoryScore {
                    category: category.name().to_string(),
                    score: sum / references.len() as f64,
                });
            }

            let ranked = rank(averages);
            let best = ranked[0].score;
            let runner_up = ranked.get(1).map(|s| s.score);
            log.push(LogEntry::RoundResult {
                best: ranked[0].category.clone(),
                best_score: best,
                runner_up: runner_up.unwrap_or(self.policy.lone_runner_up()),
            });

            if self
                .policy
                .should_stop(best, runner_up, budget, max_references)
            {
                log.push(LogEntry::FrameSettled {
                    frame: frame.file_name(),
                    budget,
                });
                ctx.logger.metric("references_per_frame", budget as f64);
                return Ok(ranked);
            }
            budget += 1;
        }
    }

    fn compare(
        &mut self,
        category: &str,
        reference_path: &Path,
        candidate: &PreparedImage,
        ctx: &mut ClassifyContext<'_>,
        log: &mut DecisionLog,
    ) -> Result<f64, Box<dyn std::error::Error>> {
        let cache = ctx.cache;
        let reference = cache
            .get(reference_path)
            .ok_or_else(|| format!("reference {} missing from cache", reference_path.display()))?;

        let started = Instant::now();
        let score = self.scorer.score(reference, candidate);
        ctx.logger
            .timing("oracle", started.elapsed().as_secs_f64() * 1000.0);

        let performed = ctx.counter.record();
        ctx.logger.progress(performed, ctx.counter.planned());

        log::debug!(
            "[{category}] {} vs {} → {score:.2}",
            reference.display_name(),
            candidate.display_name()
        );
        log.push(LogEntry::Comparison {
            category: category.to_string(),
            reference: reference.display_name(),
            score,
        });
        Ok(score)
    }
}
