use std::sync::OnceLock;

use regex::Regex;

use crate::oracle::domain::similarity_oracle::SimilarityOracle;
use crate::shared::constants::{MAX_SCORE, MIN_SCORE};
use crate::shared::prepared_image::PreparedImage;

/// Adapts a [`SimilarityOracle`] into a numeric score in `[0, 100]`.
///
/// A failed call or an answer without a number scores 0.0 and is not
/// retried.
pub struct SimilarityScorer {
    oracle: Box<dyn SimilarityOracle>,
    prompt: String,
}

impl SimilarityScorer {
    pub fn new(oracle: Box<dyn SimilarityOracle>, prompt: impl Into<String>) -> Self {
        Self {
            oracle,
            prompt: prompt.into(),
        }
    }

    pub fn score(&mut self, reference: &PreparedImage, candidate: &PreparedImage) -> f64 {
        match self.oracle.respond(&self.prompt, [reference, candidate]) {
            Ok(text) => extract_score(&text).unwrap_or_else(|| {
                log::warn!(
                    "Unparseable similarity response for {} vs {}: {text:?}",
                    reference.display_name(),
                    candidate.display_name()
                );
                MIN_SCORE
            }),
            Err(e) => {
                log::warn!(
                    "Similarity call failed for {} vs {}: {e}",
                    reference.display_name(),
                    candidate.display_name()
                );
                MIN_SCORE
            }
        }
    }
}

fn number_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[0-9]+(?:\.[0-9]+)?").expect("valid score pattern"))
}

/// First decimal or integer in the text, clamped into the score range.
pub fn extract_score(text: &str) -> Option<f64> {
    let token = number_pattern().find(text)?;
    let value: f64 = token.as_str().parse().ok()?;
    Some(value.clamp(MIN_SCORE, MAX_SCORE))
}
