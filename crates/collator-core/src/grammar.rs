//! Filename grammar for CoCs and page scans.
//!
//! ```text
//! CoC:   [0-9]{6}[a-d]?(-[0-9]{3}[a-d]?)?coc.pdf  |  (QC|WP|SP)[0-9]{3}-[0-9]{3}coc.pdf
//! Page:  [0-9]{6}[a-d]?pg[0-9].pdf                |  (QC|WP|SP)[0-9]{3}-[0-9]{3}pg[0-9].pdf
//! ```
//!
//! Names must match in full. Range CoCs get a second, semantic check: the
//! end is compared with the last three digits of the start. Equal is a
//! degenerate range; lower by less than 100 is a backwards range. Lower by
//! 100 or more is a rollover past a 1000 boundary and is accepted.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::error::{InvalidName, InvalidReason};
use crate::model::{CocKind, CocName, PageName, Rerun, SampleId, Series};

static COC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:(?P<num>[0-9]{6})(?P<rerun>[a-d])?(?:-(?P<end>[0-9]{3})(?P<end_rerun>[a-d])?)?|(?P<series>QC|WP|SP)(?P<batch>[0-9]{3})-(?P<seq>[0-9]{3}))coc\.pdf$",
    )
    .expect("CoC grammar is a valid regex")
});

static PAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:(?P<num>[0-9]{6})(?P<rerun>[a-d])?|(?P<series>QC|WP|SP)(?P<batch>[0-9]{3})-(?P<seq>[0-9]{3}))pg(?P<page>[0-9])\.pdf$",
    )
    .expect("page grammar is a valid regex")
});

/// Smallest backwards step read as a rollover rather than operator error.
pub const ROLLOVER_MIN_DIFF: u32 = 100;

/// Result of classifying an arbitrary filename.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Classified {
    Coc(CocName),
    Page(PageName),
    Invalid(InvalidName),
}

/// Classify a name as a CoC, a page, or neither.
///
/// A name that fails the CoC grammar's semantic range check is reported
/// with that reason rather than as a plain grammar miss.
#[must_use]
pub fn classify(name: &str) -> Classified {
    match parse_coc(name) {
        Ok(coc) => Classified::Coc(coc),
        Err(err) if err.reason != InvalidReason::Grammar => Classified::Invalid(err),
        Err(err) => parse_page(name).map_or(Classified::Invalid(err), Classified::Page),
    }
}

/// Parse and validate a CoC filename.
///
/// # Errors
/// Returns [`InvalidName`] when the name does not match the grammar or
/// encodes an impossible range.
pub fn parse_coc(name: &str) -> Result<CocName, InvalidName> {
    let caps = COC_RE
        .captures(name)
        .ok_or_else(|| InvalidName::new(name, InvalidReason::Grammar))?;

    if let Some(id) = control_sample(&caps) {
        return Ok(CocName::new(name.to_owned(), CocKind::Control(id)));
    }

    let number = digits(&caps, "num").ok_or_else(|| InvalidName::new(name, InvalidReason::Grammar))?;
    let rerun = rerun_letter(&caps, "rerun");

    let Some(end) = digits(&caps, "end") else {
        return Ok(CocName::new(
            name.to_owned(),
            CocKind::Single(SampleId::numeric(number, rerun)),
        ));
    };

    if rerun != rerun_letter(&caps, "end_rerun") {
        return Err(InvalidName::new(name, InvalidReason::RerunMismatch));
    }

    let start_tail = number % 1000;
    let diff = end.abs_diff(start_tail);
    if diff == 0 {
        return Err(InvalidName::new(name, InvalidReason::DegenerateRange));
    }
    if end < start_tail && diff < ROLLOVER_MIN_DIFF {
        return Err(InvalidName::new(name, InvalidReason::DescendingRange { diff }));
    }

    Ok(CocName::new(
        name.to_owned(),
        CocKind::Range {
            first: number,
            end: u16::try_from(end).map_err(|_| InvalidName::new(name, InvalidReason::Grammar))?,
            rerun,
        },
    ))
}

/// Parse and validate a page filename.
///
/// # Errors
/// Returns [`InvalidName`] with [`InvalidReason::Grammar`] when the name
/// does not match the page grammar.
pub fn parse_page(name: &str) -> Result<PageName, InvalidName> {
    let invalid = || InvalidName::new(name, InvalidReason::Grammar);
    let caps = PAGE_RE.captures(name).ok_or_else(invalid)?;

    let sample = match control_sample(&caps) {
        Some(id) => id,
        None => {
            let number = digits(&caps, "num").ok_or_else(invalid)?;
            SampleId::numeric(number, rerun_letter(&caps, "rerun"))
        }
    };
    let page = digits(&caps, "page")
        .and_then(|p| u8::try_from(p).ok())
        .ok_or_else(invalid)?;

    Ok(PageName::new(name.to_owned(), sample, page))
}

/// Outcome of validating a whole listing of CoC names.
#[derive(Clone, Debug, Default)]
pub struct CocValidation {
    pub valid: Vec<CocName>,
    pub invalid: Vec<InvalidName>,
}

/// Validate every CoC name, collecting all failures instead of stopping at
/// the first.
pub fn validate_cocs<'a, I>(names: I) -> CocValidation
where
    I: IntoIterator<Item = &'a str>,
{
    let mut out = CocValidation::default();
    for name in names {
        match parse_coc(name) {
            Ok(coc) => out.valid.push(coc),
            Err(err) => out.invalid.push(err),
        }
    }
    out
}

/// Outcome of validating a listing of page names.
#[derive(Clone, Debug, Default)]
pub struct PageValidation {
    pub valid: Vec<PageName>,
    pub invalid: Vec<InvalidName>,
}

/// Validate every page name. Invalid pages are excluded, not fatal.
pub fn validate_pages<'a, I>(names: I) -> PageValidation
where
    I: IntoIterator<Item = &'a str>,
{
    let mut out = PageValidation::default();
    for name in names {
        match parse_page(name) {
            Ok(page) => out.valid.push(page),
            Err(err) => out.invalid.push(err),
        }
    }
    out
}

fn control_sample(caps: &Captures<'_>) -> Option<SampleId> {
    let series = Series::from_prefix(caps.name("series")?.as_str())?;
    let batch = u16::try_from(digits(caps, "batch")?).ok()?;
    let sequence = u16::try_from(digits(caps, "seq")?).ok()?;
    Some(SampleId::control(series, batch, sequence))
}

fn digits(caps: &Captures<'_>, group: &str) -> Option<u32> {
    caps.name(group)?.as_str().parse().ok()
}

fn rerun_letter(caps: &Captures<'_>, group: &str) -> Option<Rerun> {
    caps.name(group)?.as_str().chars().next().and_then(Rerun::from_char)
}
