//! The page/CoC reconciliation engine.
//!
//! Drains a sorted stack of page names:
//!
//! 1. Peek the first page and locate a CoC by its sample prefix.
//! 2. No CoC: the page becomes unresolved.
//! 3. CoC found: expand its range, note which required samples have no
//!    page at all, pull every page whose sample is in the range off the
//!    stack, and emit a [`ReportBundle`].
//!
//! Every iteration removes at least the peeked page, so the loop ends after
//! at most one iteration per page. A located CoC whose range does not cover
//! the peeked page (page `123456pg1.pdf` against `123456acoc.pdf`) would
//! otherwise stall the loop; that page is marked unresolved instead.
//!
//! The engine owns its stack and accumulators. Each run starts empty, so
//! nothing carries over between runs.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::bundle::ReportBundle;
use crate::error::CoreError;
use crate::index::CocIndex;
use crate::model::{PageName, SampleId};
use crate::range;

/// Why a page could not be placed in a bundle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "kebab-case")]
pub enum UnresolvedReason {
    /// No CoC filename starts with the page's sample id.
    NoCoc,
    /// A CoC was located by prefix, but its range does not include the page.
    OutsideRange { coc: String },
}

/// A page left over after reconciliation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UnresolvedPage {
    pub page: PageName,
    #[serde(flatten)]
    pub reason: UnresolvedReason,
}

/// Result of a full run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Reconciliation {
    /// Bundles in emission order.
    pub bundles: Vec<ReportBundle>,
    /// Pages with no usable CoC, in stack order.
    pub unresolved: Vec<UnresolvedPage>,
}

/// What one iteration of the drain loop did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Step {
    Unresolved { page: String },
    Bundled { report: String, pages: usize },
}

/// Stateful engine for a single run.
#[derive(Debug)]
pub struct Reconciler<'a> {
    index: &'a CocIndex,
    stack: BTreeSet<PageName>,
    unresolved: Vec<UnresolvedPage>,
    bundles: Vec<ReportBundle>,
}

impl<'a> Reconciler<'a> {
    /// Start a run over `pages`. Duplicates collapse; order is by filename.
    pub fn new<I>(index: &'a CocIndex, pages: I) -> Self
    where
        I: IntoIterator<Item = PageName>,
    {
        Self {
            index,
            stack: pages.into_iter().collect(),
            unresolved: Vec::new(),
            bundles: Vec::new(),
        }
    }

    /// Pages not yet assigned.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.stack.len()
    }

    /// Run one iteration. Returns `None` once the stack is empty.
    ///
    /// # Errors
    /// Returns [`CoreError::Invariant`] if an iteration failed to remove the
    /// page it started from.
    pub fn step(&mut self) -> Result<Option<Step>, CoreError> {
        let Some(head) = self.stack.first().cloned() else {
            return Ok(None);
        };
        let index = self.index;
        let prefix = head.sample().to_string();

        let Some(hit) = index.locate(&prefix) else {
            return Ok(Some(self.unresolve(head, UnresolvedReason::NoCoc)));
        };

        let required = range::expand(hit.coc);
        if !required.contains(&head.sample()) {
            let reason = UnresolvedReason::OutsideRange {
                coc: hit.coc.file_name().to_owned(),
            };
            return Ok(Some(self.unresolve(head, reason)));
        }

        let present: BTreeSet<SampleId> = self.stack.iter().map(PageName::sample).collect();
        let missing_pdfs: Vec<SampleId> = required.difference(&present).copied().collect();

        let (matched, rest): (BTreeSet<PageName>, BTreeSet<PageName>) = std::mem::take(&mut self.stack)
            .into_iter()
            .partition(|p| required.contains(&p.sample()));
        self.stack = rest;
        if self.stack.contains(&head) {
            return Err(CoreError::Invariant {
                detail: format!("{head} survived matching against {}", hit.coc),
            });
        }

        let report = hit.coc.report_name();
        let pages = matched.len();
        if !missing_pdfs.is_empty() {
            tracing::warn!(
                report = %report,
                missing = missing_pdfs.len(),
                "CoC range is only partially present"
            );
        }
        tracing::info!(report = %report, coc = %hit.coc, pages, "bundle emitted");

        self.bundles.push(ReportBundle {
            report: report.clone(),
            coc_name: hit.coc.clone(),
            collection: hit.collection.to_owned(),
            coc: hit.path(),
            pdfs: matched.into_iter().collect(),
            missing_pdfs,
        });
        Ok(Some(Step::Bundled { report, pages }))
    }

    /// Drain the stack and return the bundles and unresolved pages.
    ///
    /// # Errors
    /// Propagates [`CoreError::Invariant`] from [`Reconciler::step`].
    #[tracing::instrument(skip_all, fields(pages = self.stack.len(), cocs = self.index.len()))]
    pub fn run(mut self) -> Result<Reconciliation, CoreError> {
        while let Some(step) = self.step()? {
            tracing::debug!(?step, remaining = self.stack.len(), "reconcile step");
        }
        Ok(Reconciliation {
            bundles: self.bundles,
            unresolved: self.unresolved,
        })
    }

    fn unresolve(&mut self, page: PageName, reason: UnresolvedReason) -> Step {
        self.stack.remove(&page);
        tracing::warn!(page = %page, ?reason, "page left unresolved");
        let name = page.file_name().to_owned();
        self.unresolved.push(UnresolvedPage { page, reason });
        Step::Unresolved { page: name }
    }
}

/// Reconcile a batch of pages against an index in one call.
///
/// # Errors
/// Returns [`CoreError::Invariant`] only on an engine bug.
pub fn reconcile<I>(index: &CocIndex, pages: I) -> Result<Reconciliation, CoreError>
where
    I: IntoIterator<Item = PageName>,
{
    Reconciler::new(index, pages).run()
}
