use std::path::Path;

use crate::shared::prepared_image::PreparedImage;

/// Turns an image on disk into the handle the oracle consumes.
pub trait ImagePreparer: Send {
    fn prepare(&self, path: &Path) -> Result<PreparedImage, Box<dyn std::error::Error>>;
}
