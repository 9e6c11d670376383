use std::fmt;

use crate::classification::domain::score_matrix::CategoryScore;
use crate::shared::constants::OTHERS_CATEGORY;

/// One step of a group's classification, kept for audit.
#[derive(Clone, Debug, PartialEq)]
pub enum LogEntry {
    RoundStarted {
        frame: String,
        budget: usize,
    },
    Comparison {
        category: String,
        reference: String,
        score: f64,
    },
    FrameSkipped {
        frame: String,
        reason: String,
    },
    RoundResult {
        best: String,
        best_score: f64,
        runner_up: f64,
    },
    FrameSettled {
        frame: String,
        budget: usize,
    },
    Contribution {
        category: String,
        average: f64,
    },
    Final {
        best: String,
        best_score: f64,
        runner_up: f64,
    },
    NoEvidence,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RoundStarted { frame, budget } => {
                write!(f, "Classifying: {frame} using {budget} refs")
            }
            Self::Comparison {
                category,
                reference,
                score,
            } => write!(f, " - [{category}] {reference} → Score: {score:.2}"),
            Self::FrameSkipped { frame, reason } => write!(f, "Skipped frame {frame}: {reason}"),
            Self::RoundResult {
                best,
                best_score,
                runner_up,
            } => write!(f, " → Best: {best} ({best_score:.2}), Second: {runner_up:.2}"),
            Self::FrameSettled { frame, budget } => {
                write!(f, "Settled {frame} after {budget} refs")
            }
            Self::Contribution { category, average } => {
                write!(f, "   Partial avg for {category}: {average:.2}")
            }
            Self::Final {
                best,
                best_score,
                runner_up,
            } => write!(
                f,
                "→ Final Decision: {best} ({best_score:.2}) | Second: {runner_up:.2}"
            ),
            Self::NoEvidence => write!(f, "→ No scoreable category, falling back to {OTHERS_CATEGORY}"),
        }
    }
}

/// Ordered record of every score computation behind a decision.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DecisionLog {
    entries: Vec<LogEntry>,
}

impl DecisionLog {
    pub fn push(&mut self, entry: LogEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Oracle comparisons recorded in this log.
    pub fn comparison_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e, LogEntry::Comparison { .. }))
            .count()
    }

    /// Reference budget each frame stopped at, in frame order.
    pub fn settled_budgets(&self) -> Vec<(String, usize)> {
        self.entries
            .iter()
            .filter_map(|e| match e {
                LogEntry::FrameSettled { frame, budget } => Some((frame.clone(), *budget)),
                _ => None,
            })
            .collect()
    }
}

impl fmt::Display for DecisionLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{entry}")?;
        }
        Ok(())
    }
}

/// Outcome of classifying one group.
///
/// `ambiguous` is only ever set by the fixed-budget pass; the label is then
/// provisional and meant for refinement.
#[derive(Clone, Debug, PartialEq)]
pub struct ClassificationDecision {
    pub category: String,
    pub ambiguous: bool,
    pub ranking: Vec<CategoryScore>,
    pub log: DecisionLog,
}

impl ClassificationDecision {
    /// The `others` outcome for groups with no scoreable evidence.
    pub fn fallback(mut log: DecisionLog) -> Self {
        log.push(LogEntry::NoEvidence);
        Self {
            category: OTHERS_CATEGORY.to_string(),
            ambiguous: false,
            ranking: Vec::new(),
            log,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.ranking.is_empty()
    }

    pub fn score_of(&self, category: &str) -> Option<f64> {
        self.ranking
            .iter()
            .find(|s| s.category == category)
            .map(|s| s.score)
    }
}
