//! Run-level error type for the collator CLI.
//!
//! Defines [`CollateError`]. Messages are written for document-control
//! staff: each says what went wrong and what to do about it.

use std::fmt;
use std::path::PathBuf;

use collator_core::InvalidName;

use crate::size::SizeError;

// ---------------------------------------------------------------------------
// CollateError
// ---------------------------------------------------------------------------

/// Errors that end a collation run.
#[derive(Debug)]
pub enum CollateError {
    /// One or more CoC filenames break the naming convention.
    MalformedCocNames {
        /// Every malformed name across all collections.
        names: Vec<InvalidName>,
    },

    /// A configuration file could not be loaded or parsed.
    Config {
        /// Path to the configuration file.
        path: PathBuf,
        /// Human-readable description of the problem.
        detail: String,
    },

    /// Environment checks failed before the run started.
    ChecksFailed {
        /// Names of the failing checks.
        failed: Vec<String>,
    },

    /// The renderer did not produce a report.
    Render {
        /// Report that was being rendered.
        report: String,
        /// Exit status or spawn failure, plus captured stderr.
        detail: String,
    },

    /// A file size could not be measured.
    Size(SizeError),

    /// A core invariant was broken. Indicates a bug.
    Internal {
        /// What was inconsistent.
        detail: String,
    },

    /// An I/O error occurred.
    Io(std::io::Error),
}

/// The naming cheat-sheet shown alongside naming errors.
pub const NAMING_HELP: &str = "\
Remember, the syntax for CoC names is:
  Regular:     123456coc.pdf
  Rerun:       123456acoc.pdf
  Range:       123456-457coc.pdf
  Range-rerun: 123456a-457acoc.pdf
  QC/WP/SP:    QC123-456coc.pdf (dashes are necessary!)";

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl fmt::Display for CollateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedCocNames { names } => {
                write!(f, "{} CoC file(s) are improperly named:", names.len())?;
                for n in names {
                    write!(f, "\n  * {n}")?;
                }
                write!(
                    f,
                    "\n  To fix: correct the file names, then run again.\n{NAMING_HELP}"
                )
            }
            Self::Config { path, detail } => {
                write!(
                    f,
                    "configuration error in '{}': {}\n  To fix: edit the config file and correct the issue.",
                    path.display(),
                    detail
                )
            }
            Self::ChecksFailed { failed } => {
                write!(
                    f,
                    "environment checks failed: {}\n  To fix: run `collator doctor` for details, or pass --skip-checks.",
                    failed.join(", ")
                )
            }
            Self::Render { report, detail } => {
                write!(
                    f,
                    "renderer failed for {report}: {detail}\n  To fix: check the renderer is installed (`collator doctor`) and the input PDFs open."
                )
            }
            Self::Size(err) => write!(f, "{err}"),
            Self::Internal { detail } => {
                write!(f, "internal error: {detail}\n  To fix: report this with the file listings that triggered it.")
            }
            Self::Io(err) => {
                write!(
                    f,
                    "I/O error: {err}\n  To fix: check the folders are mounted and writable."
                )
            }
        }
    }
}

// ---------------------------------------------------------------------------
// std::error::Error
// ---------------------------------------------------------------------------

impl std::error::Error for CollateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Size(err) => Some(err),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// From impls
// ---------------------------------------------------------------------------

impl From<std::io::Error> for CollateError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<SizeError> for CollateError {
    fn from(err: SizeError) -> Self {
        Self::Size(err)
    }
}

impl From<crate::config::ConfigError> for CollateError {
    fn from(err: crate::config::ConfigError) -> Self {
        Self::Config {
            path: err.path.unwrap_or_default(),
            detail: err.message,
        }
    }
}

impl From<collator_core::CoreError> for CollateError {
    fn from(err: collator_core::CoreError) -> Self {
        match err {
            collator_core::CoreError::MalformedCocNames { names } => Self::MalformedCocNames { names },
            collator_core::CoreError::Invariant { detail } => Self::Internal { detail },
        }
    }
}
