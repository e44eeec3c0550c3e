//! Directory snapshots.
//!
//! All filesystem reads for a run happen here, before reconciliation
//! starts. Listings contain regular files only, sorted, with OS artifacts
//! removed.

use std::fs;
use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use collator_core::CocCollection;

use crate::config::CollectionConfig;

/// Hidden files: `.DS_Store`, AppleDouble `._*`, `.afp_*` and friends.
#[must_use]
pub fn is_os_artifact(name: &str) -> bool {
    name.starts_with('.')
}

/// Sorted names of the entries in `dir` that are not directories,
/// artifacts removed. Symlinks are followed, so a linked file is listed;
/// a dangling link is listed too, so its name is still validated.
///
/// Names that are not valid UTF-8 are returned lossily so they still show
/// up as invalid names instead of disappearing.
///
/// # Errors
/// Returns an I/O error if the directory cannot be read.
pub fn list_dir(dir: &Path) -> io::Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.path().is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if !is_os_artifact(&name) {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

/// Snapshot every configured CoC collection, preserving configured order.
///
/// # Errors
/// Returns an error naming the collection whose directory cannot be read.
pub fn collections(configs: &[CollectionConfig]) -> Result<Vec<CocCollection>> {
    configs
        .iter()
        .map(|c| {
            let entries = list_dir(&c.path).with_context(|| {
                format!(
                    "Failed to list CoC collection '{}' at {}",
                    c.name,
                    c.path.display()
                )
            })?;
            tracing::debug!(collection = %c.name, entries = entries.len(), "collection listed");
            Ok(CocCollection {
                name: c.name.clone(),
                root: c.path.clone(),
                entries,
            })
        })
        .collect()
}
