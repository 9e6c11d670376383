use std::path::{Path, PathBuf};

/// An image ready to be handed to the similarity oracle.
///
/// The payload is opaque to the engine: infrastructure decides its encoding
/// (e.g. a base64 data URL) and the oracle implementation consumes it.
#[derive(Clone, Debug, PartialEq)]
pub struct PreparedImage {
    source: PathBuf,
    payload: String,
}

impl PreparedImage {
    pub fn new(source: impl Into<PathBuf>, payload: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            payload: payload.into(),
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// File name of the source, for log lines.
    pub fn display_name(&self) -> String {
        self.source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.source.display().to_string())
    }
}
