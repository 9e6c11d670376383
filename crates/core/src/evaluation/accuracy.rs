use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// A ground-truth group whose prediction disagreed or was missing.
#[derive(Clone, Debug, PartialEq)]
pub struct Mismatch {
    pub group_id: String,
    pub expected: String,
    pub predicted: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AccuracyReport {
    pub total: usize,
    pub correct: usize,
    pub accuracy_percent: f64,
    /// Sorted by group id.
    pub mismatches: Vec<Mismatch>,
}

/// Scores predictions against ground truth, comparing labels
/// case-insensitively. Predictions for groups absent from the ground truth
/// are ignored.
pub fn evaluate(
    ground_truth: &HashMap<String, String>,
    predictions: &HashMap<String, String>,
) -> AccuracyReport {
    let ordered: BTreeMap<&String, &String> = ground_truth.iter().collect();
    let mut correct = 0;
    let mut mismatches = Vec::new();

    for (group_id, expected) in ordered {
        let predicted = predictions.get(group_id);
        match predicted {
            Some(label) if label.to_lowercase() == expected.to_lowercase() => correct += 1,
            _ => mismatches.push(Mismatch {
                group_id: group_id.clone(),
                expected: expected.clone(),
                predicted: predicted.cloned(),
            }),
        }
    }

    let total = ground_truth.len();
    let accuracy_percent = if total > 0 {
        correct as f64 / total as f64 * 100.0
    } else {
        0.0
    };

    AccuracyReport {
        total,
        correct,
        accuracy_percent,
        mismatches,
    }
}

impl fmt::Display for AccuracyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total groups: {}", self.total)?;
        writeln!(f, "Correctly classified: {}", self.correct)?;
        write!(f, "Accuracy: {:.2}%", self.accuracy_percent)?;
        if !self.mismatches.is_empty() {
            write!(f, "\nMismatches:")?;
            for m in &self.mismatches {
                write!(
                    f,
                    "\n - {}: expected '{}', got '{}'",
                    m.group_id,
                    m.expected,
                    m.predicted.as_deref().unwrap_or("none")
                )?;
            }
        }
        Ok(())
    }
}
