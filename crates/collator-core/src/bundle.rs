//! Per-report output of reconciliation.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::model::{CocName, PageName, SampleId};

/// One report ready for rendering: its CoC, its pages, and the samples its
/// range asked for that were never found.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReportBundle {
    /// CoC filename minus the `coc` token; also the rendered filename.
    pub report: String,
    /// The CoC name this bundle was built from.
    #[serde(skip)]
    pub coc_name: CocName,
    /// Collection the CoC was found in.
    pub collection: String,
    /// Absolute path of the CoC file.
    pub coc: PathBuf,
    /// Matched pages, sorted by filename.
    pub pdfs: Vec<PageName>,
    /// Samples required by the CoC but absent from the page batch.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing_pdfs: Vec<SampleId>,
}

impl ReportBundle {
    /// Whether every sample the CoC covers had at least one page.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.missing_pdfs.is_empty()
    }

    /// Ordered renderer input: every page under `pages_dir`, then the CoC.
    #[must_use]
    pub fn render_inputs(&self, pages_dir: &Path) -> Vec<PathBuf> {
        self.pdfs
            .iter()
            .map(|p| pages_dir.join(p.file_name()))
            .chain(std::iter::once(self.coc.clone()))
            .collect()
    }
}
