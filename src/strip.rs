//! Removal of scanner job prefixes from page filenames.
//!
//! The scanner names its output `job_<digits> <name>`, e.g.
//! `job_1042 123456pg1.pdf`. The prefix is stripped before validation.
//! A name starting with `job` that does not carry a well-formed prefix is
//! malformed and reported with the invalid page names.

use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;

static JOB_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^job_[0-9]*\s").expect("job prefix pattern is a valid regex"));

/// What stripping does to a single name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stripped<'a> {
    /// No job prefix; the name is used as is.
    Unchanged,
    /// The name without its prefix.
    Stripped(&'a str),
    /// Starts with `job` but the prefix is malformed or nothing follows it.
    Malformed,
}

/// Classify and strip a single name. Pure.
#[must_use]
pub fn strip_job_prefix(name: &str) -> Stripped<'_> {
    if !name.starts_with("job") {
        return Stripped::Unchanged;
    }
    match JOB_PREFIX_RE.find(name) {
        Some(m) if m.end() < name.len() => Stripped::Stripped(&name[m.end()..]),
        _ => Stripped::Malformed,
    }
}

/// Names after stripping, plus the ones that could not be stripped.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StripOutcome {
    /// Names to validate as pages, in listing order.
    pub names: Vec<String>,
    /// Names with a malformed job prefix, or whose stripped name is taken.
    pub malformed: Vec<String>,
    /// `(old, new)` pairs that were (or would be) renamed.
    pub renamed: Vec<(String, String)>,
}

/// Compute stripped names without touching the filesystem.
///
/// `names` is the full directory listing. A stripped name that is already
/// taken, by a listed file or by an earlier rename, is reported as
/// malformed, the same as [`apply`] does.
#[must_use]
pub fn preview(names: &[String]) -> StripOutcome {
    let mut present: HashSet<&str> = names.iter().map(String::as_str).collect();
    let mut out = StripOutcome::default();
    for name in names {
        match strip_job_prefix(name) {
            Stripped::Unchanged => out.names.push(name.clone()),
            Stripped::Stripped(new) => {
                if present.contains(new) {
                    out.malformed.push(name.clone());
                    continue;
                }
                present.remove(name.as_str());
                present.insert(new);
                out.renamed.push((name.clone(), new.to_owned()));
                out.names.push(new.to_owned());
            }
            Stripped::Malformed => out.malformed.push(name.clone()),
        }
    }
    out
}

/// Strip prefixes in `dir`, renaming files on disk.
///
/// A stripped name that already exists in the directory is not
/// overwritten; the original is reported as malformed instead.
///
/// # Errors
/// Returns an error if a rename fails.
pub fn apply(dir: &Path, names: &[String]) -> Result<StripOutcome> {
    let mut out = StripOutcome::default();
    for name in names {
        match strip_job_prefix(name) {
            Stripped::Unchanged => out.names.push(name.clone()),
            Stripped::Malformed => out.malformed.push(name.clone()),
            Stripped::Stripped(new) => {
                let from = dir.join(name);
                let to = dir.join(new);
                if to.exists() {
                    tracing::warn!(from = %name, to = %new, "stripped name already exists, leaving file alone");
                    out.malformed.push(name.clone());
                    continue;
                }
                std::fs::rename(&from, &to).with_context(|| {
                    format!("Failed to rename {} to {}", from.display(), to.display())
                })?;
                tracing::debug!(from = %name, to = %new, "job prefix stripped");
                out.renamed.push((name.clone(), new.to_owned()));
                out.names.push(new.to_owned());
            }
        }
    }
    Ok(out)
}
