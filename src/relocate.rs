//! Post-collation file moves.
//!
//! After a report renders, its pages and CoC are moved to the trash so the
//! next run does not pick them up again. Rendered reports are copied into
//! the billing folder. Failures here never undo a finished report; they are
//! collected and shown to the user.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// A file that could not be moved or copied.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RelocationFailure {
    pub from: PathBuf,
    pub to: PathBuf,
    pub error: String,
}

/// Move `path` into `trash_dir`: copy, then remove the original.
///
/// If the copy fails the original is left where it is.
///
/// # Errors
/// Returns a [`RelocationFailure`] describing the step that failed.
pub fn move_to_trash(path: &Path, trash_dir: &Path) -> Result<PathBuf, RelocationFailure> {
    let target = target_in(path, trash_dir);
    let fail = |error: std::io::Error| RelocationFailure {
        from: path.to_owned(),
        to: target.clone(),
        error: error.to_string(),
    };

    fs::copy(path, &target).map_err(fail)?;
    fs::remove_file(path).map_err(fail)?;
    tracing::debug!(from = %path.display(), to = %target.display(), "moved to trash");
    Ok(target)
}

/// Move every file to the trash, collecting failures.
pub fn trash_all(paths: &[PathBuf], trash_dir: &Path) -> Vec<RelocationFailure> {
    let mut failures = Vec::new();
    for path in paths {
        if let Err(f) = move_to_trash(path, trash_dir) {
            tracing::warn!(from = %f.from.display(), error = %f.error, "could not move file to trash");
            failures.push(f);
        }
    }
    failures
}

/// Copy every rendered report into `billing_dir`, collecting failures.
pub fn copy_to_billing(reports: &[PathBuf], billing_dir: &Path) -> Vec<RelocationFailure> {
    let mut failures = Vec::new();
    for report in reports {
        let target = target_in(report, billing_dir);
        if let Err(e) = fs::copy(report, &target) {
            tracing::warn!(from = %report.display(), to = %target.display(), error = %e, "billing copy failed");
            failures.push(RelocationFailure {
                from: report.clone(),
                to: target,
                error: e.to_string(),
            });
        }
    }
    failures
}

fn target_in(path: &Path, dir: &Path) -> PathBuf {
    path.file_name().map_or_else(|| dir.to_owned(), |name| dir.join(name))
}
