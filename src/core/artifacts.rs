//! Locating the files external tools leave behind.

use std::path::{Path, PathBuf};
use std::time::SystemTime;
use walkdir::WalkDir;

use crate::domain::model::ArtifactSelection;
use crate::utils::error::{FloorplanError, Result};

/// Recursively collects files called `name` under `root`, sorted by path.
pub fn find_files_named(root: &Path, name: &str) -> Vec<PathBuf> {
    let mut found: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file() && entry.file_name() == name)
        .map(|entry| entry.into_path())
        .collect();
    found.sort();
    found
}

/// Files directly inside `dir` with the given extension (no recursion), sorted by path.
pub fn find_files_with_extension(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut found = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext == extension);
        if matches && path.is_file() {
            found.push(path);
        }
    }
    found.sort();
    Ok(found)
}

/// Newest modification time wins; on ties the later candidate in input order wins.
pub fn newest_by_mtime<T>(candidates: Vec<(T, SystemTime)>) -> Option<T> {
    let mut candidates = candidates;
    // sort_by_key 是穩定排序，同時間者保持原順序
    candidates.sort_by_key(|(_, modified)| *modified);
    candidates.pop().map(|(item, _)| item)
}

pub fn select_newest(paths: Vec<PathBuf>) -> Result<Option<PathBuf>> {
    let mut stamped = Vec::with_capacity(paths.len());
    for path in paths {
        let modified = std::fs::metadata(&path)?.modified()?;
        stamped.push((path, modified));
    }
    Ok(newest_by_mtime(stamped))
}

/// Applies `selection`: an explicit path must exist, otherwise `scan` provides candidates.
pub fn resolve_artifact<F>(
    selection: &ArtifactSelection,
    artifact: &str,
    location: &Path,
    scan: F,
) -> Result<PathBuf>
where
    F: FnOnce() -> Result<Vec<PathBuf>>,
{
    match selection {
        ArtifactSelection::Explicit(path) => {
            if path.is_file() {
                tracing::debug!("Using explicit {}: {}", artifact, path.display());
                Ok(path.clone())
            } else {
                Err(FloorplanError::MissingArtifact {
                    artifact: artifact.to_string(),
                    location: path.clone(),
                })
            }
        }
        ArtifactSelection::NewestModified => {
            let candidates = scan()?;
            tracing::debug!(
                "Found {} candidate {} file(s) under {}",
                candidates.len(),
                artifact,
                location.display()
            );
            select_newest(candidates)?.ok_or_else(|| FloorplanError::MissingArtifact {
                artifact: artifact.to_string(),
                location: location.to_path_buf(),
            })
        }
    }
}
