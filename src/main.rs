use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{ArgAction, CommandFactory, Parser, Subcommand};

use collator::collate::{self, RunOptions};
use collator::config::{CollatorConfig, OnIncomplete};
use collator::error::CollateError;
use collator::format::OutputFormat;
use collator::prompt::StdinConfirm;
use collator::render::CommandRenderer;
use collator::{doctor, telemetry};

/// Lab report collator
///
/// Matches reviewed single-page scans to their chain-of-custody (CoC)
/// documents and merges each set into one report PDF.
///
/// NAMING:
///
///   Pages:  123456pg1.pdf   QC123-456pg1.pdf
///   CoCs:   123456coc.pdf   123456acoc.pdf (rerun)
///           123456-457coc.pdf (range, end replaces the last 3 digits)
///           QC123-456coc.pdf
///
/// WORKFLOW:
///
///   1. Check names:      collator check
///   2. Preview the run:  collator plan
///   3. Collate:          collator collate
///
/// Reports land in the finished folder and are copied to billing. Pages
/// and CoCs that went into a report are moved to the trash.
#[derive(Parser)]
#[command(name = "collator")]
#[command(version, about)]
#[command(propagate_version = true)]
#[command(after_help = "See 'collator <command> --help' for more information on a specific command.")]
struct Cli {
    /// Config file [default: ./collator.toml]
    #[arg(long, global = true, env = "COLLATOR_CONFIG")]
    config: Option<PathBuf>,

    /// Log more (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate CoC and page names without changing anything
    ///
    /// Exits non-zero if any CoC is misnamed, since that blocks a run.
    /// Misnamed pages are listed but only skipped during collation.
    Check {
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show which reports a run would build, without changing anything
    Plan {
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Build the reports
    ///
    /// Strips scanner job prefixes, matches pages to CoCs, renders each
    /// report, moves its inputs to the trash and copies it to billing.
    Collate {
        /// What to do with a range report whose pages are not all present
        /// [default: from config, else prompt]
        #[arg(long, value_enum)]
        on_incomplete: Option<OnIncomplete>,

        /// Skip the environment checks run before collating
        #[arg(long)]
        skip_checks: bool,
    },

    /// Check mounts, folders and the renderer
    Doctor {
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Print a shell completion script
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    telemetry::init(cli.verbose);

    if let Commands::Completions { shell } = cli.command {
        clap_complete::generate(shell, &mut Cli::command(), "collator", &mut io::stdout());
        return Ok(ExitCode::SUCCESS);
    }

    let path = CollatorConfig::resolve_path(cli.config.as_deref());
    let config = CollatorConfig::load(&path).map_err(CollateError::from)?;
    tracing::debug!(config = %path.display(), "config loaded");

    match cli.command {
        Commands::Check { format } => check(&config, format),
        Commands::Plan { format } => plan(&config, format),
        Commands::Collate {
            on_incomplete,
            skip_checks,
        } => {
            let renderer = CommandRenderer::from_config(&config.render);
            let mut confirm = StdinConfirm::stdin();
            let opts = RunOptions {
                on_incomplete,
                skip_checks,
            };
            collate::run(&config, opts, &renderer, &mut confirm, &mut io::stdout().lock())?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Doctor { format } => {
            let ok = doctor::run(&config, format)?;
            Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
        }
        Commands::Completions { .. } => Ok(ExitCode::SUCCESS),
    }
}

fn check(config: &CollatorConfig, format: OutputFormat) -> Result<ExitCode> {
    let report = collate::check(config)?;

    match format {
        OutputFormat::Json => println!("{}", format.serialize(&report)?),
        OutputFormat::Text => {
            let mut out = io::stdout().lock();
            writeln!(
                out,
                "Checked {} CoC name(s) and {} page name(s).",
                report.cocs_checked, report.pages_checked
            )?;
            if report.passed() {
                writeln!(out, "All CoC names pass.")?;
            } else {
                let err = CollateError::MalformedCocNames {
                    names: report.malformed_cocs.clone(),
                };
                writeln!(out, "{err}")?;
            }
            if !report.invalid_pages.is_empty() {
                writeln!(out, "Page names that will be ignored:")?;
                for bad in &report.invalid_pages {
                    writeln!(out, " *  {bad}")?;
                }
            }
        }
    }

    Ok(if report.passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn plan(config: &CollatorConfig, format: OutputFormat) -> Result<ExitCode> {
    let plan = collate::plan(config)?;
    match format {
        OutputFormat::Json => println!("{}", format.serialize(&plan)?),
        OutputFormat::Text => collate::write_plan(&plan, &mut io::stdout().lock())?,
    }
    Ok(ExitCode::SUCCESS)
}
