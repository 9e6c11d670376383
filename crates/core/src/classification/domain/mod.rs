pub mod decision;
pub mod escalation_policy;
pub mod group_classifier;
pub mod score_matrix;
