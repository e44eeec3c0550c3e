//! File size probing for the before/after report table.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Reading a file size failed.
#[derive(Debug, Error)]
pub enum SizeError {
    /// The file was listed during the snapshot but is gone now; another
    /// process moved or deleted it mid-run.
    #[error("{} vanished after the folder was read; another process may have moved it", path.display())]
    Vanished { path: PathBuf },

    /// Any other failure reading metadata.
    #[error("could not read size of {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Size of one file in bytes.
///
/// # Errors
/// [`SizeError::Vanished`] if the file no longer exists, otherwise
/// [`SizeError::Io`].
pub fn file_size(path: &Path) -> Result<u64, SizeError> {
    std::fs::metadata(path)
        .map(|m| m.len())
        .map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => SizeError::Vanished {
                path: path.to_owned(),
            },
            _ => SizeError::Io {
                path: path.to_owned(),
                source,
            },
        })
}

/// Sum of the sizes of `paths`.
///
/// # Errors
/// Fails on the first file that cannot be measured.
pub fn total_size(paths: &[PathBuf]) -> Result<u64, SizeError> {
    paths.iter().try_fold(0u64, |acc, p| Ok(acc + file_size(p)?))
}

/// Binary-unit rendering: `"512.0 B"`, `"1.5 KiB"`, `"3.2 MiB"`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn humanize(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    let mut size = bytes as f64;
    for unit in &UNITS[..UNITS.len() - 1] {
        if size < 1024.0 {
            return format!("{size:3.1} {unit}");
        }
        size /= 1024.0;
    }
    format!("{size:3.1} {}", UNITS[UNITS.len() - 1])
}

/// Percentage saved going from `start` to `end` bytes.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn reduction_pct(start: u64, end: u64) -> f64 {
    if start == 0 {
        return 0.0;
    }
    100.0 - (end as f64 * 100.0) / start as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn humanize_units() {
        assert_eq!(humanize(0), "0.0 B");
        assert_eq!(humanize(512), "512.0 B");
        assert_eq!(humanize(1536), "1.5 KiB");
        assert_eq!(humanize(5 * 1024 * 1024), "5.0 MiB");
        assert_eq!(humanize(3 * 1024 * 1024 * 1024), "3.0 GiB");
    }

    #[test]
    fn reduction() {
        assert!((reduction_pct(1000, 250) - 75.0).abs() < f64::EPSILON);
        assert!((reduction_pct(1000, 1200) + 20.0).abs() < 1e-9);
        assert!(reduction_pct(0, 10).abs() < f64::EPSILON);
    }

    #[test]
    fn total_of_present_files() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.pdf");
        let b = dir.path().join("b.pdf");
        std::fs::write(&a, vec![0u8; 100]).unwrap();
        std::fs::write(&b, vec![0u8; 23]).unwrap();
        assert_eq!(total_size(&[a, b]).unwrap(), 123);
    }

    #[test]
    fn missing_file_is_vanished() {
        let dir = tempfile::tempdir().unwrap();
        let gone = dir.path().join("gone.pdf");
        match total_size(&[gone.clone()]).unwrap_err() {
            SizeError::Vanished { path } => assert_eq!(path, gone),
            other => panic!("expected Vanished, got {other}"),
        }
    }
}
