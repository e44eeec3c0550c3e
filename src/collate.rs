//! The collation run: snapshot, validate, reconcile, render, relocate.
//!
//! [`plan`] and [`check`] only read. [`prepare`] strips scanner prefixes on
//! disk, and [`execute`] renders, moves and copies. [`run`] strings the
//! steps together for the `collate` command.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use collator_core::grammar::{self, PageValidation};
use collator_core::overlap::{self, Overlap, Shadow};
use collator_core::{
    CocIndex, InvalidName, InvalidReason, Reconciliation, ReportBundle, UnresolvedPage,
    UnresolvedReason,
};
use serde::Serialize;

use crate::config::{CollatorConfig, OnIncomplete};
use crate::doctor;
use crate::error::CollateError;
use crate::prompt::Confirm;
use crate::relocate::{self, RelocationFailure};
use crate::render::Renderer;
use crate::size;
use crate::snapshot;
use crate::strip::{self, StripOutcome};

/// Question asked for each incomplete report under [`OnIncomplete::Prompt`].
pub const SKIP_QUESTION: &str = "Skip this report (y/n)?";

// ---------------------------------------------------------------------------
// Plan
// ---------------------------------------------------------------------------

/// A page renamed (or to be renamed) to drop its scanner prefix.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Rename {
    pub from: String,
    pub to: String,
}

/// Everything a run would do, computed before any report is rendered.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Plan {
    /// Folder the pages are read from.
    pub reviewed: PathBuf,
    pub renamed: Vec<Rename>,
    /// Page names that failed validation; these pages are ignored.
    pub invalid_pages: Vec<InvalidName>,
    /// Reports in emission order.
    pub bundles: Vec<ReportBundle>,
    pub unresolved: Vec<UnresolvedPage>,
    pub overlaps: Vec<Overlap>,
    pub shadows: Vec<Shadow>,
}

impl Plan {
    /// Number of reports with missing range members.
    #[must_use]
    pub fn incomplete(&self) -> usize {
        self.bundles.iter().filter(|b| !b.is_complete()).count()
    }
}

/// Snapshot and validate the CoC collections.
///
/// # Errors
/// Fails if a collection cannot be listed, or with
/// [`CollateError::MalformedCocNames`] if any CoC name is malformed.
pub fn load_index(config: &CollatorConfig) -> Result<CocIndex> {
    let collections = snapshot::collections(&config.collections)?;
    let index = CocIndex::build(collections).map_err(CollateError::from)?;
    tracing::info!(cocs = index.len(), "CoC index built");
    Ok(index)
}

fn list_reviewed(config: &CollatorConfig) -> Result<Vec<String>> {
    snapshot::list_dir(&config.paths.reviewed).with_context(|| {
        format!(
            "Failed to list reviewed pages at {}",
            config.paths.reviewed.display()
        )
    })
}

/// Compute the plan without touching the filesystem.
///
/// # Errors
/// See [`load_index`]; also fails if the reviewed folder cannot be listed.
pub fn plan(config: &CollatorConfig) -> Result<Plan> {
    let index = load_index(config)?;
    let listing = list_reviewed(config)?;
    assemble(config, &index, strip::preview(&listing))
}

/// Validate CoCs, strip scanner prefixes on disk, and compute the plan.
///
/// CoCs are validated first, so a malformed CoC stops the run before any
/// page is renamed.
///
/// # Errors
/// As [`plan`], plus any rename failure.
pub fn prepare(config: &CollatorConfig) -> Result<Plan> {
    let index = load_index(config)?;
    let listing = list_reviewed(config)?;
    let stripped = strip::apply(&config.paths.reviewed, &listing)?;
    assemble(config, &index, stripped)
}

fn assemble(config: &CollatorConfig, index: &CocIndex, stripped: StripOutcome) -> Result<Plan> {
    let PageValidation { valid, mut invalid } =
        grammar::validate_pages(stripped.names.iter().map(String::as_str));
    invalid.extend(stripped.malformed.into_iter().map(|name| InvalidName {
        name,
        reason: InvalidReason::Grammar,
    }));
    invalid.sort_by(|a, b| a.name.cmp(&b.name));
    for bad in &invalid {
        tracing::warn!(page = %bad.name, reason = %bad.reason, "invalid page name");
    }

    let overlaps = overlap::detect(index);
    let shadows = overlap::shadows(index);
    let Reconciliation {
        bundles,
        unresolved,
    } = collator_core::reconcile(index, valid).map_err(CollateError::from)?;

    Ok(Plan {
        reviewed: config.paths.reviewed.clone(),
        renamed: stripped
            .renamed
            .into_iter()
            .map(|(from, to)| Rename { from, to })
            .collect(),
        invalid_pages: invalid,
        bundles,
        unresolved,
        overlaps,
        shadows,
    })
}

// ---------------------------------------------------------------------------
// Check
// ---------------------------------------------------------------------------

/// Naming validation across every folder, without building anything.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CheckReport {
    pub cocs_checked: usize,
    pub pages_checked: usize,
    pub malformed_cocs: Vec<InvalidName>,
    pub invalid_pages: Vec<InvalidName>,
}

impl CheckReport {
    /// Malformed CoCs block a run; invalid pages do not.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.malformed_cocs.is_empty()
    }
}

/// Validate every CoC and page name. Read-only.
///
/// # Errors
/// Fails if a folder cannot be listed.
pub fn check(config: &CollatorConfig) -> Result<CheckReport> {
    let mut report = CheckReport::default();
    for collection in snapshot::collections(&config.collections)? {
        let v = grammar::validate_cocs(collection.entries.iter().map(String::as_str));
        report.cocs_checked += collection.entries.len();
        report.malformed_cocs.extend(v.invalid);
    }

    let listing = list_reviewed(config)?;
    let stripped = strip::preview(&listing);
    let v = grammar::validate_pages(stripped.names.iter().map(String::as_str));
    report.pages_checked = listing.len();
    report.invalid_pages = v.invalid;
    report
        .invalid_pages
        .extend(stripped.malformed.into_iter().map(|name| InvalidName {
            name,
            reason: InvalidReason::Grammar,
        }));
    report.invalid_pages.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(report)
}

// ---------------------------------------------------------------------------
// Execute
// ---------------------------------------------------------------------------

/// What happened to one report.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum ReportOutcome {
    Rendered {
        report: String,
        path: PathBuf,
        /// Combined size of the inputs.
        start: u64,
        /// Size of the rendered report.
        end: u64,
    },
    /// Left alone because pages were missing. Its files stay in place.
    Skipped { report: String },
}

/// Result of [`execute`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub outcomes: Vec<ReportOutcome>,
    pub trash_failures: Vec<RelocationFailure>,
    pub billing_failures: Vec<RelocationFailure>,
}

impl RunSummary {
    /// Paths of the reports rendered in this run.
    #[must_use]
    pub fn rendered(&self) -> Vec<PathBuf> {
        self.outcomes
            .iter()
            .filter_map(|o| match o {
                ReportOutcome::Rendered { path, .. } => Some(path.clone()),
                ReportOutcome::Skipped { .. } => None,
            })
            .collect()
    }
}

fn should_skip<W: Write>(
    bundle: &ReportBundle,
    policy: OnIncomplete,
    confirm: &mut dyn Confirm,
    out: &mut W,
) -> Result<bool, CollateError> {
    if bundle.is_complete() {
        return Ok(false);
    }

    writeln!(
        out,
        "Report {} indicates a range of PDFs that were not found in the reviewed folder.",
        bundle.report
    )?;
    writeln!(out, "The missing PDFs are:")?;
    for sample in &bundle.missing_pdfs {
        writeln!(out, "\t{sample}")?;
    }
    writeln!(out)?;

    Ok(match policy {
        OnIncomplete::Skip => true,
        OnIncomplete::Collate => false,
        OnIncomplete::Prompt => confirm.confirm(SKIP_QUESTION)?,
    })
}

/// Render every bundle of `plan`, then relocate inputs and copy outputs.
///
/// A renderer failure stops the run; reports rendered before it keep their
/// outputs and relocations.
///
/// # Errors
/// [`CollateError::Render`] when a report fails to render,
/// [`CollateError::Size`] when an input vanished mid-run, or an I/O
/// error from the prompt.
pub fn execute<W: Write>(
    config: &CollatorConfig,
    plan: &Plan,
    policy: OnIncomplete,
    renderer: &dyn Renderer,
    confirm: &mut dyn Confirm,
    out: &mut W,
) -> Result<RunSummary, CollateError> {
    let mut summary = RunSummary::default();

    let trash = if config.collate.relocate {
        let dir = config.paths.trash_dir();
        if dir.is_none() {
            tracing::warn!("no trash folder configured and $HOME unset, leaving inputs in place");
        }
        dir
    } else {
        None
    };

    for bundle in &plan.bundles {
        if should_skip(bundle, policy, confirm, out)? {
            tracing::info!(report = %bundle.report, "report skipped");
            summary.outcomes.push(ReportOutcome::Skipped {
                report: bundle.report.clone(),
            });
            continue;
        }

        let inputs = bundle.render_inputs(&plan.reviewed);
        let output = config.paths.finished.join(&bundle.report);
        let start = size::total_size(&inputs)?;

        writeln!(out, "Collating {} ({} page(s))...", bundle.report, bundle.pdfs.len())?;
        renderer
            .render(&inputs, &output)
            .map_err(|e| CollateError::Render {
                report: bundle.report.clone(),
                detail: e.to_string(),
            })?;
        let end = size::file_size(&output)?;
        tracing::info!(report = %bundle.report, start, end, "report rendered");

        if let Some(trash) = &trash {
            summary
                .trash_failures
                .extend(relocate::trash_all(&inputs, trash));
        }
        summary.outcomes.push(ReportOutcome::Rendered {
            report: bundle.report.clone(),
            path: output,
            start,
            end,
        });
    }

    if config.collate.copy_to_billing {
        summary.billing_failures =
            relocate::copy_to_billing(&summary.rendered(), &config.paths.billing);
    }
    Ok(summary)
}

// ---------------------------------------------------------------------------
// Run
// ---------------------------------------------------------------------------

/// Options for [`run`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Overrides `collate.on_incomplete` when set.
    pub on_incomplete: Option<OnIncomplete>,
    pub skip_checks: bool,
}

/// The whole `collate` command.
///
/// Returns `None` when there was nothing to collate.
///
/// # Errors
/// Failing environment checks, malformed CoC names, renderer failures and
/// I/O errors end the run.
pub fn run<W: Write>(
    config: &CollatorConfig,
    opts: RunOptions,
    renderer: &dyn Renderer,
    confirm: &mut dyn Confirm,
    out: &mut W,
) -> Result<Option<RunSummary>> {
    if !opts.skip_checks {
        let checks = doctor::checks(config);
        let failed = doctor::failed(&checks);
        if !failed.is_empty() {
            return Err(CollateError::ChecksFailed { failed }.into());
        }
    }

    if list_reviewed(config)?.is_empty() {
        writeln!(
            out,
            "No files exist in the reviewed reports folder for collation."
        )?;
        return Ok(None);
    }

    let plan = prepare(config)?;
    write_warnings(&plan, out)?;

    let policy = opts.on_incomplete.unwrap_or(config.collate.on_incomplete);
    let summary = execute(config, &plan, policy, renderer, confirm, out)?;

    write!(out, "{}", summary_table(&summary.outcomes))?;
    write_failures(&summary, out)?;
    Ok(Some(summary))
}

// ---------------------------------------------------------------------------
// Text output
// ---------------------------------------------------------------------------

const RULE: &str = "--------------------------------------------------------";

/// The before/after size table printed at the end of a run.
#[must_use]
pub fn summary_table(outcomes: &[ReportOutcome]) -> String {
    use std::fmt::Write as _;

    let mut s = String::new();
    let _ = writeln!(s, "{RULE}");
    let _ = writeln!(s, "Report Name               File size             Reduced");
    let _ = writeln!(s, "{RULE}");
    for o in outcomes {
        let _ = match o {
            ReportOutcome::Rendered {
                report, start, end, ..
            } => writeln!(
                s,
                "{:<26} {:<15} {:>11.2}%",
                report,
                size::humanize(*end),
                size::reduction_pct(*start, *end)
            ),
            ReportOutcome::Skipped { report } => {
                writeln!(s, "{report:<26} {:<15} {:>12}", "Skipped", "Skipped")
            }
        };
    }
    s
}

fn unresolved_line(u: &UnresolvedPage) -> String {
    match &u.reason {
        UnresolvedReason::NoCoc => format!("{}: no CoC found", u.page),
        UnresolvedReason::OutsideRange { coc } => {
            format!("{}: {coc} was found but does not cover this page", u.page)
        }
    }
}

/// Warnings about pages and CoCs that will not be collated as expected.
///
/// # Errors
/// Propagates write failures.
pub fn write_warnings<W: Write>(plan: &Plan, out: &mut W) -> std::io::Result<()> {
    if !plan.invalid_pages.is_empty() {
        writeln!(
            out,
            "The following PDFs do not match the naming scheme and will be ignored:"
        )?;
        for bad in &plan.invalid_pages {
            writeln!(out, " *  {bad}")?;
        }
        writeln!(out)?;
    }

    if !plan.unresolved.is_empty() {
        writeln!(
            out,
            "The following PDFs could not be matched with a CoC and will be ignored."
        )?;
        writeln!(
            out,
            "Please check that the CoCs exist before running this program again."
        )?;
        for u in &plan.unresolved {
            writeln!(out, " *  {}", unresolved_line(u))?;
        }
        writeln!(out)?;
    }

    for o in &plan.overlaps {
        writeln!(
            out,
            "warning: sample {} is claimed by {} ({} wins)",
            o.sample,
            o.claimants.join(", "),
            o.claimants.first().map_or("none", String::as_str)
        )?;
    }
    for s in &plan.shadows {
        writeln!(
            out,
            "warning: {} can only be reached through its range; {} is found first",
            s.coc, s.shadowed_by
        )?;
    }
    Ok(())
}

/// Human-readable rendering of a plan.
///
/// # Errors
/// Propagates write failures.
pub fn write_plan<W: Write>(plan: &Plan, out: &mut W) -> std::io::Result<()> {
    for r in &plan.renamed {
        writeln!(out, "rename: {} -> {}", r.from, r.to)?;
    }
    if !plan.renamed.is_empty() {
        writeln!(out)?;
    }

    writeln!(
        out,
        "{} report(s), {} incomplete:",
        plan.bundles.len(),
        plan.incomplete()
    )?;
    for b in &plan.bundles {
        writeln!(
            out,
            "  {:<26} {:<10} {} page(s)",
            b.report,
            b.collection,
            b.pdfs.len()
        )?;
        if !b.is_complete() {
            let missing: Vec<String> = b.missing_pdfs.iter().map(ToString::to_string).collect();
            writeln!(out, "    missing: {}", missing.join(", "))?;
        }
    }
    writeln!(out)?;
    write_warnings(plan, out)
}

fn write_failures<W: Write>(summary: &RunSummary, out: &mut W) -> std::io::Result<()> {
    for f in &summary.trash_failures {
        writeln!(
            out,
            "warning: could not move {} to {}: {}",
            f.from.display(),
            f.to.display(),
            f.error
        )?;
    }
    for f in &summary.billing_failures {
        writeln!(
            out,
            "There was a problem copying the report from {} to {}! Please double check the files are in the correct locations. ({})",
            f.from.display(),
            f.to.display(),
            f.error
        )?;
    }
    Ok(())
}
