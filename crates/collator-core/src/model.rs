//! Typed filename components.
//!
//! Values here are only produced by [`crate::grammar`] (or by range
//! expansion) and are never mutated afterwards. Each type renders back to
//! exactly the text it was parsed from.

use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Rerun
// ---------------------------------------------------------------------------

/// Rerun letter marking a repeated sample (`123456a`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Rerun {
    A,
    B,
    C,
    D,
}

impl Rerun {
    /// Parse a single lowercase rerun letter.
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'a' => Some(Self::A),
            'b' => Some(Self::B),
            'c' => Some(Self::C),
            'd' => Some(Self::D),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::A => 'a',
            Self::B => 'b',
            Self::C => 'c',
            Self::D => 'd',
        }
    }
}

impl fmt::Display for Rerun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

// ---------------------------------------------------------------------------
// Series
// ---------------------------------------------------------------------------

/// Prefix family of non-numeric samples. These never form ranges.
///
/// Declaration order matches the byte order of the prefixes so the derived
/// `Ord` agrees with filename sorting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Series {
    /// Quality control.
    Qc,
    /// Spiked sample.
    Sp,
    /// Proficiency (WP) sample.
    Wp,
}

impl Series {
    #[must_use]
    pub fn from_prefix(s: &str) -> Option<Self> {
        match s {
            "QC" => Some(Self::Qc),
            "SP" => Some(Self::Sp),
            "WP" => Some(Self::Wp),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Qc => "QC",
            Self::Sp => "SP",
            Self::Wp => "WP",
        }
    }
}

// ---------------------------------------------------------------------------
// SampleId
// ---------------------------------------------------------------------------

/// A sample identifier: the part of a filename before `coc` or `pg#`.
///
/// Numeric ids render zero-padded to six digits. The derived ordering is
/// numeric, which agrees with filename order for every six-digit id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(into = "String")]
pub enum SampleId {
    /// `123456` or `123456a`.
    Numeric { number: u32, rerun: Option<Rerun> },
    /// `QC123-456`.
    Control {
        series: Series,
        batch: u16,
        sequence: u16,
    },
}

impl SampleId {
    #[must_use]
    pub const fn numeric(number: u32, rerun: Option<Rerun>) -> Self {
        Self::Numeric { number, rerun }
    }

    #[must_use]
    pub const fn control(series: Series, batch: u16, sequence: u16) -> Self {
        Self::Control {
            series,
            batch,
            sequence,
        }
    }
}

impl fmt::Display for SampleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric { number, rerun } => {
                write!(f, "{number:06}")?;
                if let Some(r) = rerun {
                    write!(f, "{r}")?;
                }
                Ok(())
            }
            Self::Control {
                series,
                batch,
                sequence,
            } => write!(f, "{}{batch:03}-{sequence:03}", series.as_str()),
        }
    }
}

impl From<SampleId> for String {
    fn from(id: SampleId) -> Self {
        id.to_string()
    }
}

// ---------------------------------------------------------------------------
// CocName
// ---------------------------------------------------------------------------

/// The shape of a validated CoC filename.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CocKind {
    /// `123456coc.pdf` or `123456acoc.pdf`.
    Single(SampleId),
    /// `123450-456coc.pdf` or `123450a-456acoc.pdf`.
    ///
    /// `end` replaces the last three digits of `first`. The grammar rejects
    /// degenerate and slightly-backwards ranges before one of these exists.
    Range {
        first: u32,
        end: u16,
        rerun: Option<Rerun>,
    },
    /// `QC123-456coc.pdf`. Covers exactly itself.
    Control(SampleId),
}

/// A validated chain-of-custody filename.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CocName {
    file_name: String,
    kind: CocKind,
}

impl CocName {
    pub(crate) const fn new(file_name: String, kind: CocKind) -> Self {
        Self { file_name, kind }
    }

    /// The filename exactly as listed in its collection.
    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    #[must_use]
    pub const fn kind(&self) -> &CocKind {
        &self.kind
    }

    /// The first sample the CoC names. For ranges, the start of the range.
    #[must_use]
    pub const fn leading_sample(&self) -> SampleId {
        match self.kind {
            CocKind::Single(id) | CocKind::Control(id) => id,
            CocKind::Range { first, rerun, .. } => SampleId::numeric(first, rerun),
        }
    }

    /// The filename with the `coc` token removed (`123450-456.pdf`).
    ///
    /// Used as the bundle key and the rendered report's filename.
    #[must_use]
    pub fn report_name(&self) -> String {
        let stem = match self.kind {
            CocKind::Single(id) | CocKind::Control(id) => id.to_string(),
            CocKind::Range { first, end, rerun } => {
                let letter = rerun.map(Rerun::as_char).map(String::from).unwrap_or_default();
                format!("{first:06}{letter}-{end:03}{letter}")
            }
        };
        format!("{stem}.pdf")
    }
}

impl fmt::Display for CocName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.file_name)
    }
}

impl Serialize for CocName {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.file_name)
    }
}

// ---------------------------------------------------------------------------
// PageName
// ---------------------------------------------------------------------------

/// A validated single-page scan filename (`123456pg1.pdf`).
///
/// Ordering is by filename, so sorting a batch puts pages of a report in
/// `pg1`, `pg2`, ... order and range members in ascending order.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PageName {
    file_name: String,
    sample: SampleId,
    page: u8,
}

impl PageName {
    pub(crate) const fn new(file_name: String, sample: SampleId, page: u8) -> Self {
        Self {
            file_name,
            sample,
            page,
        }
    }

    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// The sample this page belongs to; the filename minus `pg#.pdf`.
    #[must_use]
    pub const fn sample(&self) -> SampleId {
        self.sample
    }

    #[must_use]
    pub const fn page(&self) -> u8 {
        self.page
    }
}

impl fmt::Display for PageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.file_name)
    }
}

impl Serialize for PageName {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.file_name)
    }
}
