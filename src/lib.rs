//! collator library crate.
//!
//! The primary interface is the `collator` binary. The modules are public so
//! integration tests and benches can drive a run with a stand-in renderer
//! and scripted answers instead of Ghostscript and a terminal.

pub mod collate;
pub mod config;
pub mod doctor;
pub mod error;
pub mod format;
pub mod prompt;
pub mod relocate;
pub mod render;
pub mod size;
pub mod snapshot;
pub mod strip;
pub mod telemetry;
