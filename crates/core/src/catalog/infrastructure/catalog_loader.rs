use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::catalog::domain::reference_catalog::{Category, ReferenceCatalog, ReferenceImage};
use crate::catalog::domain::reference_id::ReferenceId;
use crate::shared::constants::{is_image_extension, CATALOG_FILE_NAME};

/// Configuration failures. Fatal: the batch never starts.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("category definition not found: {0}")]
    MissingCatalog(PathBuf),
    #[error("reference directory not found: {0}")]
    MissingReferenceDir(PathBuf),
    #[error("malformed category definition at {path}:{line}: {reason}")]
    Malformed {
        path: PathBuf,
        line: usize,
        reason: String,
    },
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Loads `<reference_dir>/categories.txt` and the reference images beside it.
pub fn load_from_dir(reference_dir: &Path) -> Result<ReferenceCatalog, CatalogError> {
    load(&reference_dir.join(CATALOG_FILE_NAME), reference_dir)
}

/// Builds a catalog from an `index:name` definition file and a directory of
/// reference images named `<index>[-<position>][-...].<ext>`.
///
/// Reference files whose index is not declared are skipped.
pub fn load(catalog_path: &Path, reference_dir: &Path) -> Result<ReferenceCatalog, CatalogError> {
    if !catalog_path.is_file() {
        return Err(CatalogError::MissingCatalog(catalog_path.to_path_buf()));
    }
    if !reference_dir.is_dir() {
        return Err(CatalogError::MissingReferenceDir(reference_dir.to_path_buf()));
    }

    let text = fs::read_to_string(catalog_path).map_err(|e| CatalogError::Io {
        path: catalog_path.to_path_buf(),
        source: e,
    })?;
    let declarations = parse_definitions(&text, catalog_path)?;

    let mut name_by_index: HashMap<u32, String> = HashMap::new();
    for (index, name) in &declarations {
        name_by_index.insert(*index, name.clone());
    }
    // A redeclared index drops the name it replaced unless another index still uses it.
    let mut names: Vec<String> = Vec::new();
    for (_, name) in declarations {
        if !names.contains(&name) && name_by_index.values().any(|n| *n == name) {
            names.push(name);
        }
    }

    let mut references: HashMap<String, Vec<(ReferenceId, String, PathBuf)>> = HashMap::new();
    for (file_name, path) in list_images(reference_dir)? {
        let Some(stem) = Path::new(&file_name).file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let Some(id) = ReferenceId::parse(stem) else {
            log::debug!("Skipping reference without category index: {file_name}");
            continue;
        };
        let Some(name) = name_by_index.get(&id.category_index) else {
            log::debug!("Skipping reference for undeclared index {}: {file_name}", id.category_index);
            continue;
        };
        references
            .entry(name.clone())
            .or_default()
            .push((id, file_name, path));
    }

    let categories = names
        .into_iter()
        .map(|name| {
            let refs = references.remove(&name).unwrap_or_default();
            Category::new(name, order_references(refs))
        })
        .collect();

    let catalog = ReferenceCatalog::new(categories);
    log::info!(
        "Loaded {} categories with {} reference images",
        catalog.categories().len(),
        catalog.total_references()
    );
    Ok(catalog)
}

fn parse_definitions(text: &str, path: &Path) -> Result<Vec<(u32, String)>, CatalogError> {
    let malformed = |line: usize, reason: String| CatalogError::Malformed {
        path: path.to_path_buf(),
        line,
        reason,
    };

    let mut declarations = Vec::new();
    for (i, raw) in text.lines().enumerate() {
        let Some((index, name)) = raw.trim().split_once(':') else {
            continue;
        };
        let index: u32 = index
            .trim()
            .parse()
            .map_err(|_| malformed(i + 1, format!("invalid index '{}'", index.trim())))?;
        let name = name.trim().to_lowercase();
        if name.is_empty() {
            return Err(malformed(i + 1, format!("empty name for index {index}")));
        }
        declarations.push((index, name));
    }
    Ok(declarations)
}

/// Image files in the directory, sorted by file name.
fn list_images(dir: &Path) -> Result<Vec<(String, PathBuf)>, CatalogError> {
    let io_err = |e| CatalogError::Io {
        path: dir.to_path_buf(),
        source: e,
    };

    let mut images = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if !path.is_file() {
            continue;
        }
        let is_image = path
            .extension()
            .and_then(|e| e.to_str())
            .map(is_image_extension)
            .unwrap_or(false);
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()).map(String::from) else {
            continue;
        };
        if is_image {
            images.push((file_name, path));
        }
    }
    images.sort();
    Ok(images)
}

/// Explicit positions first in ascending order, then unpositioned files by
/// name.
fn order_references(mut refs: Vec<(ReferenceId, String, PathBuf)>) -> Vec<ReferenceImage> {
    refs.sort_by(|a, b| {
        let key_a = (a.0.position.is_none(), a.0.position, &a.1);
        let key_b = (b.0.position.is_none(), b.0.position, &b.1);
        key_a.cmp(&key_b)
    });
    refs.into_iter()
        .map(|(_, _, path)| ReferenceImage::new(path))
        .collect()
}
