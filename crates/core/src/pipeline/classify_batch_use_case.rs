use std::path::PathBuf;

use crate::catalog::domain::reference_catalog::ReferenceCatalog;
use crate::catalog::infrastructure::reference_cache::ReferenceCache;
use crate::classification::domain::decision::ClassificationDecision;
use crate::classification::domain::group_classifier::{ClassifyContext, GroupClassifier};
use crate::frames::domain::frame_grouper::FrameGroup;
use crate::frames::domain::group_collapser::GroupCollapser;
use crate::pipeline::batch_logger::BatchLogger;
use crate::pipeline::comparison_counter::ComparisonCounter;

/// Final state of one group after the batch.
#[derive(Clone, Debug, PartialEq)]
pub struct GroupOutcome {
    pub group_id: String,
    pub representative: Option<PathBuf>,
    pub decision: ClassificationDecision,
    /// Whether the adaptive pass replaced the first-pass decision.
    pub refined: bool,
}

/// Two-pass batch classification: fixed budget over every group, then
/// adaptive refinement of the groups the first pass left ambiguous.
///
/// Refined groups are handed to the collapser, if any, once their label is
/// final. `on_progress(done, total)` is called after each group of a pass;
/// returning `false` stops the batch with a "Cancelled" error.
pub struct ClassifyBatchUseCase {
    sorter: GroupClassifier,
    refiner: Option<GroupClassifier>,
    collapser: Option<Box<dyn GroupCollapser>>,
    logger: Box<dyn BatchLogger>,
    on_progress: Option<Box<dyn Fn(usize, usize) -> bool + Send>>,
}

impl ClassifyBatchUseCase {
    pub fn new(
        sorter: GroupClassifier,
        refiner: Option<GroupClassifier>,
        collapser: Option<Box<dyn GroupCollapser>>,
        logger: Box<dyn BatchLogger>,
        on_progress: Option<Box<dyn Fn(usize, usize) -> bool + Send>>,
    ) -> Self {
        Self {
            sorter,
            refiner,
            collapser,
            logger,
            on_progress,
        }
    }

    pub fn execute(
        &mut self,
        groups: &[FrameGroup],
        catalog: &ReferenceCatalog,
        cache: &ReferenceCache,
    ) -> Result<Vec<GroupOutcome>, Box<dyn std::error::Error>> {
        let mut outcomes = self.sort_pass(groups, catalog, cache)?;

        if self.refiner.is_some() {
            self.refine_pass(groups, &mut outcomes, catalog, cache)?;
        }

        self.logger.summary();
        Ok(outcomes)
    }

    fn sort_pass(
        &mut self,
        groups: &[FrameGroup],
        catalog: &ReferenceCatalog,
        cache: &ReferenceCache,
    ) -> Result<Vec<GroupOutcome>, Box<dyn std::error::Error>> {
        let mut counter = ComparisonCounter::for_fixed_pass(groups, catalog);
        self.logger.info(&format!(
            "Sorting {} groups, {} comparisons planned",
            groups.len(),
            counter.planned()
        ));

        let mut outcomes = Vec::with_capacity(groups.len());
        for (i, group) in groups.iter().enumerate() {
            let mut ctx = ClassifyContext {
                catalog,
                cache,
                counter: &mut counter,
                logger: &mut *self.logger,
            };
            let decision = self.sorter.classify(group, &mut ctx)?;
            log::debug!("Decision log for '{}':\n{}", group.id(), decision.log);
            log::info!(
                "{} → {}{}",
                group.id(),
                decision.category,
                if decision.ambiguous { " (ambiguous)" } else { "" }
            );

            outcomes.push(GroupOutcome {
                group_id: group.id().to_string(),
                representative: group.representative().map(|f| f.path().to_path_buf()),
                decision,
                refined: false,
            });
            self.report_progress(i + 1, groups.len())?;
        }
        Ok(outcomes)
    }

    fn refine_pass(
        &mut self,
        groups: &[FrameGroup],
        outcomes: &mut [GroupOutcome],
        catalog: &ReferenceCatalog,
        cache: &ReferenceCache,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let Some(refiner) = self.refiner.as_mut() else {
            return Ok(());
        };

        let pending: Vec<usize> = outcomes
            .iter()
            .enumerate()
            .filter(|(_, o)| o.decision.ambiguous)
            .map(|(i, _)| i)
            .collect();
        if pending.is_empty() {
            self.logger.info("No ambiguous groups to refine");
            return Ok(());
        }

        let ambiguous: Vec<FrameGroup> = pending.iter().map(|&i| groups[i].clone()).collect();
        let mut counter = ComparisonCounter::for_adaptive_pass(&ambiguous, catalog);
        self.logger.info(&format!(
            "Refining {} ambiguous groups, at least {} comparisons planned",
            ambiguous.len(),
            counter.planned()
        ));

        for (done, (&index, group)) in pending.iter().zip(&ambiguous).enumerate() {
            let mut ctx = ClassifyContext {
                catalog,
                cache,
                counter: &mut counter,
                logger: &mut *self.logger,
            };
            let decision = refiner.classify(group, &mut ctx)?;
            log::debug!("Refinement log for '{}':\n{}", group.id(), decision.log);
            log::info!(
                "{} refined: {} → {}",
                group.id(),
                outcomes[index].decision.category,
                decision.category
            );

            let outcome = &mut outcomes[index];
            outcome.decision = decision;
            outcome.refined = true;

            if let Some(collapser) = self.collapser.as_mut() {
                if let Err(e) = collapser.collapse(group, &outcome.decision.category) {
                    log::warn!("Failed to collapse group '{}': {e}", group.id());
                }
            }

            if let Some(ref callback) = self.on_progress {
                if !callback(done + 1, ambiguous.len()) {
                    return Err("Cancelled".into());
                }
            }
        }
        Ok(())
    }

    fn report_progress(
        &self,
        current: usize,
        total: usize,
    ) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(ref callback) = self.on_progress {
            if !callback(current, total) {
                return Err("Cancelled".into());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::domain::reference_catalog::{Category, ReferenceImage};
    use crate::classification::domain::escalation_policy::EscalationPolicy;
    use crate::frames::domain::frame_grouper::group;
    use crate::oracle::domain::image_preparer::ImagePreparer;
    use crate::oracle::domain::similarity_oracle::SimilarityOracle;
    use crate::oracle::domain::similarity_scorer::SimilarityScorer;
    use crate::pipeline::batch_logger::NullBatchLogger;
    use crate::shared::prepared_image::PreparedImage;
    use std::collections::HashMap;
    use std::path::Path;
    use std::sync::{Arc, Mutex};

    // --- Stubs ---

    /// Replies by (reference file, group id of the candidate frame).
    struct GroupAwareOracle {
        replies: HashMap<(String, String), String>,
        calls: Arc<Mutex<usize>>,
    }

    impl GroupAwareOracle {
        fn new(replies: &[(&str, &str, &str)]) -> Self {
            Self {
                replies: replies
                    .iter()
                    .map(|(r, g, s)| ((r.to_string(), g.to_string()), s.to_string()))
                    .collect(),
                calls: Arc::new(Mutex::new(0)),
            }
        }
    }

    impl SimilarityOracle for GroupAwareOracle {
        fn respond(
            &mut self,
            _prompt: &str,
            images: [&PreparedImage; 2],
        ) -> Result<String, Box<dyn std::error::Error>> {
            *self.calls.lock().unwrap() += 1;
            let reference = images[0].display_name();
            let frame = images[1].display_name();
            let group_id = frame.split('_').next().unwrap_or_default().to_string();
            self.replies
                .get(&(reference, group_id))
                .cloned()
                .ok_or_else(|| "unexpected comparison".into())
        }
    }

    struct StubPreparer;

    impl ImagePreparer for StubPreparer {
        fn prepare(&self, path: &Path) -> Result<PreparedImage, Box<dyn std::error::Error>> {
            Ok(PreparedImage::new(path, ""))
        }
    }

    struct RecordingCollapser {
        collapsed: Arc<Mutex<Vec<(String, String)>>>,
        fail: bool,
    }

    impl GroupCollapser for RecordingCollapser {
        fn collapse(
            &mut self,
            group: &FrameGroup,
            label: &str,
        ) -> Result<(), Box<dyn std::error::Error>> {
            if self.fail {
                return Err("permission denied".into());
            }
            self.collapsed
                .lock()
                .unwrap()
                .push((group.id().to_string(), label.to_string()));
            Ok(())
        }
    }

    struct RecordingLogger {
        progress: Arc<Mutex<Vec<(usize, usize)>>>,
    }

    impl BatchLogger for RecordingLogger {
        fn progress(&mut self, performed: usize, planned: usize) {
            self.progress.lock().unwrap().push((performed, planned));
        }
        fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
        fn metric(&mut self, _name: &str, _value: f64) {}
        fn info(&mut self, _message: &str) {}
    }

    // --- Helpers ---

    fn reference(name: &str) -> ReferenceImage {
        ReferenceImage::new(PathBuf::from("/refs").join(name))
    }

    fn catalog() -> ReferenceCatalog {
        ReferenceCatalog::new(vec![
            Category::new("a", vec![reference("0-1.png")]),
            Category::new("b", vec![reference("1-1.png"), reference("1-2.png")]),
        ])
    }

    fn groups() -> Vec<FrameGroup> {
        group(
            ["cd_0.jpg", "ab_0.jpg", "cd_1.jpg", "ab_1.jpg"]
                .iter()
                .map(|n| PathBuf::from("/input").join(n)),
        )
    }

    /// First pass: `cd` is clearly `a`, `ab` is a near tie led by `a`.
    fn sort_oracle() -> GroupAwareOracle {
        GroupAwareOracle::new(&[
            ("0-1.png", "cd", "90"),
            ("1-1.png", "cd", "40"),
            ("1-2.png", "cd", "40"),
            ("0-1.png", "ab", "60"),
            ("1-1.png", "ab", "58"),
            ("1-2.png", "ab", "58"),
        ])
    }

    /// Refinement: `ab` is clearly `b`.
    fn refine_oracle() -> GroupAwareOracle {
        GroupAwareOracle::new(&[
            ("0-1.png", "ab", "10"),
            ("1-1.png", "ab", "50"),
            ("1-2.png", "ab", "50"),
        ])
    }

    fn classifier(oracle: GroupAwareOracle, policy: EscalationPolicy) -> GroupClassifier {
        GroupClassifier::new(
            SimilarityScorer::new(Box::new(oracle), "compare"),
            Box::new(StubPreparer),
            policy,
        )
    }

    fn cache(catalog: &ReferenceCatalog) -> ReferenceCache {
        ReferenceCache::build(catalog, &StubPreparer).unwrap()
    }

    // --- Tests ---

    #[test]
    fn test_outcomes_follow_group_order() {
        let catalog = catalog();
        let mut uc = ClassifyBatchUseCase::new(
            classifier(sort_oracle(), EscalationPolicy::fixed(5.0)),
            None,
            None,
            Box::new(NullBatchLogger),
            None,
        );

        let outcomes = uc.execute(&groups(), &catalog, &cache(&catalog)).unwrap();

        let ids: Vec<_> = outcomes.iter().map(|o| o.group_id.as_str()).collect();
        assert_eq!(ids, vec!["cd", "ab"]);
        assert_eq!(
            outcomes[0].representative,
            Some(PathBuf::from("/input/cd_0.jpg"))
        );
    }

    #[test]
    fn test_without_refiner_ambiguity_is_reported() {
        let catalog = catalog();
        let mut uc = ClassifyBatchUseCase::new(
            classifier(sort_oracle(), EscalationPolicy::fixed(5.0)),
            None,
            None,
            Box::new(NullBatchLogger),
            None,
        );

        let outcomes = uc.execute(&groups(), &catalog, &cache(&catalog)).unwrap();

        assert_eq!(outcomes[0].decision.category, "a");
        assert!(!outcomes[0].decision.ambiguous);
        assert_eq!(outcomes[1].decision.category, "a");
        assert!(outcomes[1].decision.ambiguous);
        assert!(outcomes.iter().all(|o| !o.refined));
    }

    #[test]
    fn test_refines_only_ambiguous_groups() {
        let catalog = catalog();
        let refine = refine_oracle();
        let refine_calls = refine.calls.clone();
        let mut uc = ClassifyBatchUseCase::new(
            classifier(sort_oracle(), EscalationPolicy::fixed(5.0)),
            Some(classifier(refine, EscalationPolicy::adaptive(1.0))),
            None,
            Box::new(NullBatchLogger),
            None,
        );

        let outcomes = uc.execute(&groups(), &catalog, &cache(&catalog)).unwrap();

        assert!(!outcomes[0].refined);
        assert_eq!(outcomes[0].decision.category, "a");
        assert!(outcomes[1].refined);
        assert_eq!(outcomes[1].decision.category, "b");
        assert!(outcomes.iter().all(|o| !o.decision.ambiguous));
        // Two frames, one reference per category at k = 1.
        assert_eq!(*refine_calls.lock().unwrap(), 4);
    }

    #[test]
    fn test_collapses_refined_groups_with_final_label() {
        let catalog = catalog();
        let collapsed = Arc::new(Mutex::new(Vec::new()));
        let mut uc = ClassifyBatchUseCase::new(
            classifier(sort_oracle(), EscalationPolicy::fixed(5.0)),
            Some(classifier(refine_oracle(), EscalationPolicy::adaptive(1.0))),
            Some(Box::new(RecordingCollapser {
                collapsed: collapsed.clone(),
                fail: false,
            })),
            Box::new(NullBatchLogger),
            None,
        );

        uc.execute(&groups(), &catalog, &cache(&catalog)).unwrap();

        assert_eq!(
            *collapsed.lock().unwrap(),
            vec![("ab".to_string(), "b".to_string())]
        );
    }

    #[test]
    fn test_collapse_failure_keeps_decision() {
        let catalog = catalog();
        let mut uc = ClassifyBatchUseCase::new(
            classifier(sort_oracle(), EscalationPolicy::fixed(5.0)),
            Some(classifier(refine_oracle(), EscalationPolicy::adaptive(1.0))),
            Some(Box::new(RecordingCollapser {
                collapsed: Arc::new(Mutex::new(Vec::new())),
                fail: true,
            })),
            Box::new(NullBatchLogger),
            None,
        );

        let outcomes = uc.execute(&groups(), &catalog, &cache(&catalog)).unwrap();
        assert_eq!(outcomes[1].decision.category, "b");
    }

    #[test]
    fn test_no_ambiguous_groups_skips_refiner() {
        let catalog = catalog();
        let refine = GroupAwareOracle::new(&[]);
        let refine_calls = refine.calls.clone();
        let collapsed = Arc::new(Mutex::new(Vec::new()));
        let mut uc = ClassifyBatchUseCase::new(
            classifier(sort_oracle(), EscalationPolicy::fixed(5.0)),
            Some(classifier(refine, EscalationPolicy::adaptive(1.0))),
            Some(Box::new(RecordingCollapser {
                collapsed: collapsed.clone(),
                fail: false,
            })),
            Box::new(NullBatchLogger),
            None,
        );

        let only_cd: Vec<FrameGroup> = groups().into_iter().filter(|g| g.id() == "cd").collect();
        let outcomes = uc.execute(&only_cd, &catalog, &cache(&catalog)).unwrap();

        assert_eq!(outcomes.len(), 1);
        assert_eq!(*refine_calls.lock().unwrap(), 0);
        assert!(collapsed.lock().unwrap().is_empty());
    }

    #[test]
    fn test_progress_plans_per_pass() {
        let catalog = catalog();
        let progress = Arc::new(Mutex::new(Vec::new()));
        let mut uc = ClassifyBatchUseCase::new(
            classifier(sort_oracle(), EscalationPolicy::fixed(5.0)),
            Some(classifier(refine_oracle(), EscalationPolicy::adaptive(1.0))),
            None,
            Box::new(RecordingLogger {
                progress: progress.clone(),
            }),
            None,
        );

        uc.execute(&groups(), &catalog, &cache(&catalog)).unwrap();

        let progress = progress.lock().unwrap();
        // 4 frames × 3 references, then 2 frames × 2 categories.
        assert_eq!(progress.len(), 16);
        assert_eq!(progress[11], (12, 12));
        assert_eq!(progress[12], (1, 4));
        assert_eq!(progress[15], (4, 4));
    }

    #[test]
    fn test_cancel_via_on_progress() {
        let catalog = catalog();
        let sort = sort_oracle();
        let calls = sort.calls.clone();
        let mut uc = ClassifyBatchUseCase::new(
            classifier(sort, EscalationPolicy::fixed(5.0)),
            None,
            None,
            Box::new(NullBatchLogger),
            Some(Box::new(|_, _| false)),
        );

        let result = uc.execute(&groups(), &catalog, &cache(&catalog));

        assert_eq!(result.unwrap_err().to_string(), "Cancelled");
        // The first group ran to completion before the check.
        assert_eq!(*calls.lock().unwrap(), 6);
    }

    #[test]
    fn test_on_progress_returning_true_continues() {
        let catalog = catalog();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        let mut uc = ClassifyBatchUseCase::new(
            classifier(sort_oracle(), EscalationPolicy::fixed(5.0)),
            Some(classifier(refine_oracle(), EscalationPolicy::adaptive(1.0))),
            None,
            Box::new(NullBatchLogger),
            Some(Box::new(move |done, total| {
                seen_clone.lock().unwrap().push((done, total));
                true
            })),
        );

        uc.execute(&groups(), &catalog, &cache(&catalog)).unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![(1, 2), (2, 2), (1, 1)]);
    }

    #[test]
    fn test_empty_batch() {
        let catalog = catalog();
        let mut uc = ClassifyBatchUseCase::new(
            classifier(GroupAwareOracle::new(&[]), EscalationPolicy::fixed(5.0)),
            Some(classifier(GroupAwareOracle::new(&[]), EscalationPolicy::adaptive(1.0))),
            None,
            Box::new(NullBatchLogger),
            None,
        );

        assert!(uc.execute(&[], &catalog, &cache(&catalog)).unwrap().is_empty());
    }
}
