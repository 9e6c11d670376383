/// Per-frame runner-up score assumed by the adaptive policy when only one
/// category could be scored.
const ADAPTIVE_LONE_RUNNER_UP: f64 = -1.0;

/// Group-level runner-up score assumed by the fixed-budget policy when only
/// one category could be scored.
const FIXED_LONE_RUNNER_UP: f64 = 0.0;

/// How many references a frame consults per category, and when a result is
/// good enough.
///
/// Both policies drive the same classification algorithm; they differ only
/// in the reference budget schedule and in whether a close result is
/// reported as ambiguous.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EscalationPolicy {
    /// One round consulting every reference; groups whose leader is ahead
    /// by less than `ambiguity_margin` are flagged ambiguous.
    FixedBudget { ambiguity_margin: f64 },
    /// Rounds with a growing budget `k = 1, 2, ...` until the leader is
    /// ahead by more than `confidence_margin` or references run out. Always
    /// commits to a label.
    Adaptive { confidence_margin: f64 },
}

impl EscalationPolicy {
    pub fn fixed(ambiguity_margin: f64) -> Self {
        Self::FixedBudget { ambiguity_margin }
    }

    pub fn adaptive(confidence_margin: f64) -> Self {
        Self::Adaptive { confidence_margin }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::FixedBudget { .. } => "fixed-budget",
            Self::Adaptive { .. } => "adaptive",
        }
    }

    /// Reference budget of a frame's first round.
    pub fn initial_budget(&self, max_references: usize) -> usize {
        match self {
            Self::FixedBudget { .. } => max_references,
            Self::Adaptive { .. } => max_references.min(1),
        }
    }

    /// Whether a frame's escalation ends after the round just scored.
    pub fn should_stop(
        &self,
        best: f64,
        runner_up: Option<f64>,
        budget: usize,
        max_references: usize,
    ) -> bool {
        if budget >= max_references {
            return true;
        }
        match self {
            Self::FixedBudget { .. } => true,
            Self::Adaptive { confidence_margin } => {
                best - runner_up.unwrap_or(ADAPTIVE_LONE_RUNNER_UP) > *confidence_margin
            }
        }
    }

    /// Whether a group-level result is too close to accept.
    pub fn is_ambiguous(&self, best: f64, runner_up: Option<f64>) -> bool {
        match self {
            Self::FixedBudget { ambiguity_margin } => {
                best - runner_up.unwrap_or(FIXED_LONE_RUNNER_UP) < *ambiguity_margin
            }
            Self::Adaptive { .. } => false,
        }
    }

    /// Runner-up value shown in decision logs when none exists.
    pub fn lone_runner_up(&self) -> f64 {
        match self {
            Self::FixedBudget { .. } => FIXED_LONE_RUNNER_UP,
            Self::Adaptive { .. } => ADAPTIVE_LONE_RUNNER_UP,
        }
    }
}
