use crate::catalog::domain::reference_catalog::ReferenceCatalog;
use crate::frames::domain::frame_grouper::{frame_count, FrameGroup};

/// Oracle comparisons planned versus performed for one pass.
///
/// Observability only: the counter never gates or throttles scoring. For
/// the adaptive pass the plan is a lower bound, so `performed` may exceed
/// `planned`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ComparisonCounter {
    planned: usize,
    performed: usize,
}

impl ComparisonCounter {
    pub fn new(planned: usize) -> Self {
        Self {
            planned,
            performed: 0,
        }
    }

    /// Every frame against every reference.
    pub fn for_fixed_pass(groups: &[FrameGroup], catalog: &ReferenceCatalog) -> Self {
        Self::new(frame_count(groups) * catalog.total_references())
    }

    /// Every frame against one reference per scoreable category.
    pub fn for_adaptive_pass(groups: &[FrameGroup], catalog: &ReferenceCatalog) -> Self {
        Self::new(frame_count(groups) * catalog.scoreable_categories().count())
    }

    pub fn record(&mut self) -> usize {
        self.performed += 1;
        self.performed
    }

    pub fn planned(&self) -> usize {
        self.planned
    }

    pub fn performed(&self) -> usize {
        self.performed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::domain::reference_catalog::{Category, ReferenceImage};
    use crate::frames::domain::frame_grouper::group;
    use std::path::PathBuf;

    fn reference(path: &str) -> ReferenceImage {
        ReferenceImage::new(path)
    }

    fn fixture() -> (Vec<FrameGroup>, ReferenceCatalog) {
        let groups = group(
            ["a_0.jpg", "a_1.jpg", "b_0.jpg"]
                .iter()
                .map(|n| PathBuf::from(n)),
        );
        let catalog = ReferenceCatalog::new(vec![
            Category::new("x", vec![reference("0-1.png")]),
            Category::new("y", vec![reference("1-1.png"), reference("1-2.png")]),
            Category::new("z", vec![]),
        ]);
        (groups, catalog)
    }

    #[test]
    fn test_fixed_plan_covers_every_reference() {
        let (groups, catalog) = fixture();
        assert_eq!(ComparisonCounter::for_fixed_pass(&groups, &catalog).planned(), 9);
    }

    #[test]
    fn test_adaptive_plan_is_one_reference_per_scoreable_category() {
        let (groups, catalog) = fixture();
        assert_eq!(
            ComparisonCounter::for_adaptive_pass(&groups, &catalog).planned(),
            6
        );
    }

    #[test]
    fn test_record_counts_up() {
        let mut counter = ComparisonCounter::new(4);
        assert_eq!(counter.record(), 1);
        assert_eq!(counter.record(), 2);
        assert_eq!(counter.performed(), 2);
        assert_eq!(counter.planned(), 4);
    }

    #[test]
    fn test_performed_may_exceed_plan() {
        let mut counter = ComparisonCounter::new(1);
        counter.record();
        counter.record();
        assert_eq!(counter.performed(), 2);
        assert_eq!(counter.planned(), 1);
    }
}
