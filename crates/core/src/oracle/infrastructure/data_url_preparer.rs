use std::fs;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use thiserror::Error;

use crate::oracle::domain::image_preparer::ImagePreparer;
use crate::shared::prepared_image::PreparedImage;

#[derive(Error, Debug)]
pub enum PrepareError {
    #[error("failed to read image {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unrecognized image format: {path}")]
    UnknownFormat {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Encodes image files as base64 `data:` URLs for chat completion requests.
///
/// The format is sniffed from the file contents, so a mislabeled extension
/// still yields the right MIME type.
#[derive(Default)]
pub struct DataUrlPreparer;

impl DataUrlPreparer {
    pub fn new() -> Self {
        Self
    }
}

pub fn encode_data_url(path: &Path, bytes: &[u8]) -> Result<String, PrepareError> {
    let format = image::guess_format(bytes).map_err(|e| PrepareError::UnknownFormat {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(format!(
        "data:{};base64,{}",
        format.to_mime_type(),
        STANDARD.encode(bytes)
    ))
}

impl ImagePreparer for DataUrlPreparer {
    fn prepare(&self, path: &Path) -> Result<PreparedImage, Box<dyn std::error::Error>> {
        let bytes = fs::read(path).map_err(|e| PrepareError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        let url = encode_data_url(path, &bytes)?;
        Ok(PreparedImage::new(path, url))
    }
}
