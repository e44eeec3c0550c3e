//! Expansion of a CoC name into the samples it covers.
//!
//! Only range CoCs expand to more than one sample. The end of a range
//! replaces the last three digits of the start; when that lands below the
//! start the range has rolled over a 1000 boundary and 1000 is added.
//! Rerun letters are reattached after the arithmetic, so a rerun range
//! rolls over exactly like a plain one.

use std::collections::BTreeSet;

use crate::model::{CocKind, CocName, Rerun, SampleId};

/// Inclusive numeric bounds of a range CoC after rollover correction.
#[must_use]
pub const fn bounds(first: u32, end: u16) -> (u32, u32) {
    let mut last = first - first % 1000 + end as u32;
    if last < first {
        last += 1000;
    }
    (first, last)
}

/// The set of samples a CoC is expected to cover. Never empty.
#[must_use]
pub fn expand(coc: &CocName) -> BTreeSet<SampleId> {
    match *coc.kind() {
        CocKind::Single(id) | CocKind::Control(id) => BTreeSet::from([id]),
        CocKind::Range { first, end, rerun } => expand_range(first, end, rerun),
    }
}

fn expand_range(first: u32, end: u16, rerun: Option<Rerun>) -> BTreeSet<SampleId> {
    let (first, last) = bounds(first, end);
    debug_assert!(last > first && last - first < 1000, "grammar admitted an unbounded range");
    (first..=last).map(|n| SampleId::numeric(n, rerun)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::parse_coc;

    fn rendered(name: &str) -> Vec<String> {
        expand(&parse_coc(name).unwrap())
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    #[test]
    fn single_expands_to_itself() {
        assert_eq!(rendered("123456coc.pdf"), ["123456"]);
        assert_eq!(rendered("123456ccoc.pdf"), ["123456c"]);
    }

    #[test]
    fn control_is_passed_through() {
        assert_eq!(rendered("QC123-456coc.pdf"), ["QC123-456"]);
    }

    #[test]
    fn plain_range() {
        assert_eq!(
            rendered("123456-460coc.pdf"),
            ["123456", "123457", "123458", "123459", "123460"]
        );
    }

    #[test]
    fn rerun_range_keeps_letter() {
        assert_eq!(rendered("123456a-458acoc.pdf"), ["123456a", "123457a", "123458a"]);
    }

    #[test]
    fn rollover_crosses_thousand_boundary() {
        assert_eq!(
            rendered("123995-002coc.pdf"),
            ["123995", "123996", "123997", "123998", "123999", "124000", "124001", "124002"]
        );
    }

    #[test]
    fn rerun_rollover_matches_plain_rollover() {
        let plain = rendered("400990-010coc.pdf");
        let rerun = rendered("400990d-010dcoc.pdf");
        assert_eq!(plain.len(), 21);
        assert_eq!(rerun.len(), plain.len());
        for (p, r) in plain.iter().zip(&rerun) {
            assert_eq!(format!("{p}d"), *r);
        }
    }

    #[test]
    fn leading_zeros_survive_expansion() {
        assert_eq!(rendered("012345-347coc.pdf"), ["012345", "012346", "012347"]);
    }

    #[test]
    fn rollover_past_six_digits_renders_seven() {
        let ids = rendered("999998-001coc.pdf");
        assert_eq!(ids, ["999998", "999999", "1000000", "1000001"]);
    }

    #[test]
    fn bounds_apply_rollover() {
        assert_eq!(bounds(123_456, 458), (123_456, 123_458));
        assert_eq!(bounds(123_995, 2), (123_995, 124_002));
    }
}
