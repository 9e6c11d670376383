use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::catalog::domain::reference_catalog::ReferenceCatalog;
use crate::oracle::domain::image_preparer::ImagePreparer;
use crate::shared::prepared_image::PreparedImage;

/// Prepared reference images keyed by path, built once per batch.
///
/// Holds exactly one entry per distinct reference path. Owned by the caller
/// and passed to classifiers, so separate batches never share state.
#[derive(Debug, Default)]
pub struct ReferenceCache {
    entries: HashMap<PathBuf, PreparedImage>,
}

impl ReferenceCache {
    /// Prepares every reference in the catalog up front.
    ///
    /// A reference that cannot be prepared aborts the build.
    pub fn build(
        catalog: &ReferenceCatalog,
        preparer: &dyn ImagePreparer,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let mut entries: HashMap<PathBuf, PreparedImage> = HashMap::new();
        for path in catalog.reference_paths() {
            if entries.contains_key(path) {
                continue;
            }
            let prepared = preparer.prepare(path)?;
            entries.insert(path.to_path_buf(), prepared);
        }
        log::debug!("Prepared {} reference images", entries.len());
        Ok(Self { entries })
    }

    pub fn get(&self, path: &Path) -> Option<&PreparedImage> {
        self.entries.get(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
