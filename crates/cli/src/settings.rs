use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use vidsort_core::shared::constants::{
    DEFAULT_AMBIGUITY_MARGIN, DEFAULT_CONFIDENCE_MARGIN, DEFAULT_ENDPOINT, DEFAULT_REFINE_MODEL,
    DEFAULT_SORT_MODEL, DEFAULT_TIMEOUT_SECS,
};

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("cannot read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid settings file {path}: expected a JSON object")]
    NotAnObject { path: PathBuf },
}

/// Persistent sorter configuration. Fields missing from the file keep their
/// defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SorterSettings {
    pub endpoint: String,
    pub sort_model: String,
    pub refine_model: String,
    pub timeout_secs: u64,
    pub ambiguity_margin: f64,
    pub confidence_margin: f64,
    pub progress_throttle: usize,
}

impl Default for SorterSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            sort_model: DEFAULT_SORT_MODEL.to_string(),
            refine_model: DEFAULT_REFINE_MODEL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            ambiguity_margin: DEFAULT_AMBIGUITY_MARGIN,
            confidence_margin: DEFAULT_CONFIDENCE_MARGIN,
            progress_throttle: 25,
        }
    }
}

impl SorterSettings {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("vidsort").join("settings.json"))
    }

    /// Loads from an explicit path, which must exist, or else from the
    /// platform config dir, falling back to defaults when nothing is there.
    pub fn load(explicit: Option<&Path>) -> Result<Self, SettingsError> {
        match explicit {
            Some(path) => Self::load_from(path),
            None => match Self::default_path() {
                Some(path) => Self::load_optional(&path),
                None => Ok(Self::default()),
            },
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let json = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let parse_err = |source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        };
        let value: serde_json::Value = serde_json::from_str(&json).map_err(parse_err)?;
        if !value.is_object() {
            return Err(SettingsError::NotAnObject {
                path: path.to_path_buf(),
            });
        }
        serde_json::from_value(value).map_err(parse_err)
    }

    fn load_optional(path: &Path) -> Result<Self, SettingsError> {
        match Self::load_from(path) {
            Err(SettingsError::Read { source, .. }) if source.kind() == ErrorKind::NotFound => {
                log::debug!("No settings at {}, using defaults", path.display());
                Ok(Self::default())
            }
            other => other,
        }
    }
}
