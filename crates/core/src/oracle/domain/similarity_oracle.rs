use crate::shared::prepared_image::PreparedImage;

/// Domain interface for the external vision model.
///
/// Receives a task prompt and two images (reference first, candidate
/// second) and answers with free text that is expected to contain a score.
/// Implementations may hold connection state, hence `&mut self`.
pub trait SimilarityOracle: Send {
    fn respond(
        &mut self,
        prompt: &str,
        images: [&PreparedImage; 2],
    ) -> Result<String, Box<dyn std::error::Error>>;
}
