use std::path::{Path, PathBuf};

use crate::shared::constants::OTHERS_CATEGORY;

/// A labeled example image used as a comparison baseline.
#[derive(Clone, Debug, PartialEq)]
pub struct ReferenceImage {
    path: PathBuf,
}

impl ReferenceImage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// One classification target and its ordered reference images.
///
/// Reference order is consultation order: the adaptive pass reads the
/// first `k` references, so front-loaded images matter most.
#[derive(Clone, Debug, PartialEq)]
pub struct Category {
    name: String,
    references: Vec<ReferenceImage>,
}

impl Category {
    pub fn new(name: impl Into<String>, references: Vec<ReferenceImage>) -> Self {
        Self {
            name: name.into(),
            references,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn references(&self) -> &[ReferenceImage] {
        &self.references
    }

    /// The first `budget` references, or all of them if there are fewer.
    pub fn leading_references(&self, budget: usize) -> &[ReferenceImage] {
        &self.references[..budget.min(self.references.len())]
    }

    pub fn is_scoreable(&self) -> bool {
        !self.references.is_empty()
    }
}

/// Read-only mapping from category to its reference images, in catalog
/// declaration order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReferenceCatalog {
    categories: Vec<Category>,
}

impl ReferenceCatalog {
    /// Builds a catalog, merging categories that share a name into the
    /// first declaration so names stay unique.
    pub fn new(categories: Vec<Category>) -> Self {
        let mut merged: Vec<Category> = Vec::with_capacity(categories.len());
        for category in categories {
            match merged.iter_mut().find(|c| c.name == category.name) {
                Some(existing) => existing.references.extend(category.references),
                None => merged.push(category),
            }
        }
        Self { categories: merged }
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn category(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// Categories with at least one reference, in declaration order.
    pub fn scoreable_categories(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter().filter(|c| c.is_scoreable())
    }

    pub fn total_references(&self) -> usize {
        self.categories.iter().map(|c| c.references.len()).sum()
    }

    pub fn max_references(&self) -> usize {
        self.categories
            .iter()
            .map(|c| c.references.len())
            .max()
            .unwrap_or(0)
    }

    pub fn reference_paths(&self) -> impl Iterator<Item = &Path> {
        self.categories
            .iter()
            .flat_map(|c| c.references.iter().map(ReferenceImage::path))
    }

    /// Every label a decision can carry: declared categories, then the
    /// synthetic `others` fallback unless the catalog declares it itself.
    pub fn all_labels(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = self.categories.iter().map(|c| c.name()).collect();
        if !labels.contains(&OTHERS_CATEGORY) {
            labels.push(OTHERS_CATEGORY);
        }
        labels
    }
}
