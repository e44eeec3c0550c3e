//! Detection of samples claimed by more than one CoC.
//!
//! Matching stays first-match-wins; this only reports where that rule is
//! making a choice, so staff can rename the CoCs if the choice is wrong.
//!
//! Two situations are reported:
//!
//! - [`Overlap`]: a sample lies in the expansion of several CoCs.
//! - [`Shadow`]: a CoC can never be located through its own leading sample
//!   because an earlier CoC's filename also starts with that prefix
//!   (`123456acoc.pdf` sorts before `123456coc.pdf`).

use std::collections::BTreeMap;

use serde::Serialize;

use crate::index::CocIndex;
use crate::model::SampleId;
use crate::range;

/// A sample covered by two or more CoCs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Overlap {
    pub sample: SampleId,
    /// Claiming CoC filenames in lookup order; the first one wins.
    pub claimants: Vec<String>,
}

/// Every overlapping sample, in sample order.
#[must_use]
pub fn detect(index: &CocIndex) -> Vec<Overlap> {
    let mut claims: BTreeMap<SampleId, Vec<String>> = BTreeMap::new();
    for hit in index.iter() {
        for sample in range::expand(hit.coc) {
            let list = claims.entry(sample).or_default();
            let name = hit.coc.file_name();
            if !list.iter().any(|n| n == name) {
                list.push(name.to_owned());
            }
        }
    }

    let overlaps: Vec<Overlap> = claims
        .into_iter()
        .filter(|(_, claimants)| claimants.len() > 1)
        .map(|(sample, claimants)| Overlap { sample, claimants })
        .collect();
    if !overlaps.is_empty() {
        tracing::warn!(count = overlaps.len(), "samples claimed by more than one CoC");
    }
    overlaps
}

/// A CoC hidden behind an earlier CoC sharing its prefix.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Shadow {
    pub coc: String,
    pub shadowed_by: String,
}

/// Every CoC whose leading sample locates a different CoC.
#[must_use]
pub fn shadows(index: &CocIndex) -> Vec<Shadow> {
    let mut out = Vec::new();
    for hit in index.iter() {
        let prefix = hit.coc.leading_sample().to_string();
        if let Some(first) = index.locate(&prefix)
            && first.coc.file_name() != hit.coc.file_name()
        {
            out.push(Shadow {
                coc: hit.coc.file_name().to_owned(),
                shadowed_by: first.coc.file_name().to_owned(),
            });
        }
    }
    if !out.is_empty() {
        tracing::warn!(count = out.len(), "CoCs shadowed by an earlier prefix match");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::tests::collection;

    #[test]
    fn disjoint_cocs_have_no_overlap() {
        let idx = CocIndex::build(vec![collection(
            "austin",
            &["123456coc.pdf", "123457-459coc.pdf", "QC123-456coc.pdf"],
        )])
        .unwrap();
        assert!(detect(&idx).is_empty());
    }

    #[test]
    fn overlapping_ranges_list_claimants_in_lookup_order() {
        let idx = CocIndex::build(vec![
            collection("austin", &["123458coc.pdf"]),
            collection("corpus", &["123456-458coc.pdf"]),
        ])
        .unwrap();
        let overlaps = detect(&idx);
        assert_eq!(overlaps.len(), 1);
        assert_eq!(overlaps[0].sample.to_string(), "123458");
        assert_eq!(overlaps[0].claimants, ["123458coc.pdf", "123456-458coc.pdf"]);
    }

    #[test]
    fn rerun_and_plain_do_not_overlap() {
        let idx = CocIndex::build(vec![collection("austin", &["123456coc.pdf", "123456acoc.pdf"])])
            .unwrap();
        assert!(detect(&idx).is_empty());
        assert_eq!(
            shadows(&idx),
            [Shadow {
                coc: "123456coc.pdf".to_owned(),
                shadowed_by: "123456acoc.pdf".to_owned(),
            }]
        );
    }

    #[test]
    fn range_shadows_single_with_same_start() {
        let idx = CocIndex::build(vec![collection("austin", &["123456coc.pdf", "123456-458coc.pdf"])])
            .unwrap();
        let found = shadows(&idx);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].coc, "123456coc.pdf");
        assert_eq!(found[0].shadowed_by, "123456-458coc.pdf");
        assert_eq!(detect(&idx).len(), 1);
    }

    #[test]
    fn same_name_in_two_collections_is_one_claimant() {
        let idx = CocIndex::build(vec![
            collection("austin", &["123456coc.pdf"]),
            collection("corpus", &["123456coc.pdf"]),
        ])
        .unwrap();
        assert!(detect(&idx).is_empty());
        assert!(shadows(&idx).is_empty());
    }
}
