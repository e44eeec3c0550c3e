//! Error types for the collator core.
//!
//! Naming problems are data, not control flow: [`InvalidName`] values are
//! collected per run and surfaced together. [`CoreError`] is only returned
//! where a whole batch must stop.

use serde::Serialize;
use thiserror::Error;

/// Why a filename was rejected by the grammar.
#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum InvalidReason {
    /// The name does not match the CoC or page naming convention at all.
    #[error("does not match the naming convention")]
    Grammar,

    /// A range whose end equals its start (`123456-456coc.pdf`).
    #[error("range start and end are the same")]
    DegenerateRange,

    /// A range whose end is slightly below its start. Only a drop of 100 or
    /// more is read as a rollover past a 1000 boundary.
    #[error("range runs backwards by {diff}; ranges must count upwards")]
    DescendingRange {
        /// Absolute distance between the start's last three digits and the end.
        diff: u32,
    },

    /// A rerun range whose two ends do not carry the same rerun letter.
    #[error("rerun letter must appear on both ends of the range")]
    RerunMismatch,
}

/// A filename that failed validation, with the reason.
#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize)]
#[error("{name}: {reason}")]
pub struct InvalidName {
    /// The offending filename, as listed.
    pub name: String,
    /// Why it was rejected.
    pub reason: InvalidReason,
}

impl InvalidName {
    pub(crate) fn new(name: &str, reason: InvalidReason) -> Self {
        Self {
            name: name.to_owned(),
            reason,
        }
    }
}

/// Errors that stop a batch.
#[derive(Debug, Error)]
pub enum CoreError {
    /// One or more CoC filenames are malformed. The index is all-or-nothing.
    #[error("{} malformed CoC name(s): {}", names.len(), join_names(names))]
    MalformedCocNames {
        /// Every malformed name found across all collections.
        names: Vec<InvalidName>,
    },

    /// A structural invariant of the core was broken. Indicates a bug, not
    /// bad input.
    #[error("internal invariant violated: {detail}")]
    Invariant {
        /// What was found to be inconsistent.
        detail: String,
    },
}

fn join_names(names: &[InvalidName]) -> String {
    names
        .iter()
        .map(|n| n.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
