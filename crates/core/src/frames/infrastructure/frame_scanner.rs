use std::fs;
use std::path::{Path, PathBuf};

/// Lists the regular files in a frame directory, sorted by file name so
/// grouping and representative selection are reproducible across runs.
pub fn scan_dir(dir: &Path) -> Result<Vec<PathBuf>, std::io::Error> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}
