//! Lookup over every known CoC name.
//!
//! # Lookup order
//!
//! [`CocIndex::locate`] is first-match-wins. The order is fixed so that a
//! run is reproducible:
//!
//! 1. collections in the order they were given to [`CocIndex::build`];
//! 2. within a collection, filenames in byte-wise lexicographic order.
//!
//! Listing order from the filesystem never leaks into matching. When two
//! CoCs could claim the same page (overlapping ranges, or `123456coc.pdf`
//! next to `123456-458coc.pdf`), the earlier one in this order wins. See
//! [`crate::overlap`] for surfacing those cases.

use std::path::{Path, PathBuf};

use crate::error::CoreError;
use crate::grammar;
use crate::model::CocName;

/// A raw snapshot of one CoC source location.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CocCollection {
    /// Short name used in reports (e.g. `"austin"`).
    pub name: String,
    /// Directory the CoC files live in.
    pub root: PathBuf,
    /// Filenames found there, OS artifacts already removed.
    pub entries: Vec<String>,
}

#[derive(Clone, Debug)]
struct Entry {
    coc: CocName,
    collection: usize,
}

#[derive(Clone, Debug)]
struct CollectionInfo {
    name: String,
    root: PathBuf,
}

/// A located CoC and where it lives.
#[derive(Clone, Copy, Debug)]
pub struct CocMatch<'a> {
    pub coc: &'a CocName,
    pub collection: &'a str,
    root: &'a Path,
}

impl CocMatch<'_> {
    /// Absolute path of the CoC file.
    #[must_use]
    pub fn path(&self) -> PathBuf {
        self.root.join(self.coc.file_name())
    }
}

/// Read-only index over all CoC collections of a run.
#[derive(Clone, Debug)]
pub struct CocIndex {
    collections: Vec<CollectionInfo>,
    entries: Vec<Entry>,
}

impl CocIndex {
    /// Validate every name in every collection and build the index.
    ///
    /// # Errors
    /// Returns [`CoreError::MalformedCocNames`] listing every bad name if
    /// any name in any collection fails the grammar. Nothing is indexed in
    /// that case.
    pub fn build(collections: Vec<CocCollection>) -> Result<Self, CoreError> {
        let mut infos = Vec::with_capacity(collections.len());
        let mut entries = Vec::new();
        let mut invalid = Vec::new();

        for (pos, mut collection) in collections.into_iter().enumerate() {
            collection.entries.sort_unstable();
            let checked = grammar::validate_cocs(collection.entries.iter().map(String::as_str));
            invalid.extend(checked.invalid);
            entries.extend(checked.valid.into_iter().map(|coc| Entry {
                coc,
                collection: pos,
            }));
            infos.push(CollectionInfo {
                name: collection.name,
                root: collection.root,
            });
        }

        if !invalid.is_empty() {
            return Err(CoreError::MalformedCocNames { names: invalid });
        }

        tracing::debug!(
            collections = infos.len(),
            cocs = entries.len(),
            "CoC index built"
        );
        Ok(Self {
            collections: infos,
            entries,
        })
    }

    /// First CoC, in lookup order, whose filename starts with `prefix`.
    ///
    /// A rerun CoC sorts before its plain sibling, so with `123456acoc.pdf`
    /// and `123456coc.pdf` both present, `locate("123456")` always returns
    /// the rerun. Plain `123456pg*.pdf` pages then end up `OutsideRange` and
    /// `123456coc.pdf` is never reached; [`crate::overlap::shadows`] reports
    /// it. The fix is to rename or refile one of the two CoCs.
    #[must_use]
    pub fn locate(&self, prefix: &str) -> Option<CocMatch<'_>> {
        self.entries
            .iter()
            .find(|e| e.coc.file_name().starts_with(prefix))
            .map(|e| self.to_match(e))
    }

    /// Every CoC in lookup order.
    pub fn iter(&self) -> impl Iterator<Item = CocMatch<'_>> {
        self.entries.iter().map(|e| self.to_match(e))
    }

    /// Flat list of CoC filenames in lookup order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.coc.file_name()).collect()
    }

    /// Name of the collection the given CoC filename resolves to.
    #[must_use]
    pub fn collection_of(&self, file_name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.coc.file_name() == file_name)
            .map(|e| self.collections[e.collection].name.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn to_match<'a>(&'a self, entry: &'a Entry) -> CocMatch<'a> {
        let info = &self.collections[entry.collection];
        CocMatch {
            coc: &entry.coc,
            collection: &info.name,
            root: &info.root,
        }
    }
}
