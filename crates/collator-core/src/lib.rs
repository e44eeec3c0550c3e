//! Core reconciliation logic for the report collator.
//!
//! Everything in this crate is pure: it sees filenames, never files. The
//! CLI crate takes directory snapshots, hands the names to this crate, and
//! acts on the [`ReportBundle`]s that come back.
//!
//! Pipeline:
//!
//! ```text
//! CoC listings ──▶ grammar::parse_coc ──▶ CocIndex (built once)
//!                                            │
//! page listing ──▶ grammar::parse_page ──▶ reconcile ──▶ [ReportBundle] + unresolved
//! ```

pub mod bundle;
pub mod error;
pub mod grammar;
pub mod index;
pub mod model;
pub mod overlap;
pub mod range;
pub mod reconcile;

pub use bundle::ReportBundle;
pub use error::{CoreError, InvalidName, InvalidReason};
pub use index::{CocCollection, CocIndex, CocMatch};
pub use model::{CocKind, CocName, PageName, Rerun, SampleId, Series};
pub use reconcile::{Reconciliation, Reconciler, UnresolvedPage, UnresolvedReason, reconcile};
