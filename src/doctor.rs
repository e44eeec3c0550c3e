use std::path::Path;
use std::process::Command;

use anyhow::Result;
use serde::Serialize;

use crate::config::CollatorConfig;
use crate::format::OutputFormat;

#[derive(Serialize)]
struct DoctorEnvelope<'a> {
    checks: &'a [DoctorCheck],
    all_ok: bool,
}

/// Outcome of one check.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Ok,
    Warn,
    Fail,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DoctorCheck {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix: Option<String>,
}

impl DoctorCheck {
    fn ok(name: &str, message: String) -> Self {
        Self {
            name: name.to_owned(),
            status: CheckStatus::Ok,
            message,
            fix: None,
        }
    }

    fn warn(name: &str, message: String, fix: Option<String>) -> Self {
        Self {
            name: name.to_owned(),
            status: CheckStatus::Warn,
            message,
            fix,
        }
    }

    fn fail(name: &str, message: String, fix: String) -> Self {
        Self {
            name: name.to_owned(),
            status: CheckStatus::Fail,
            message,
            fix: Some(fix),
        }
    }
}

fn print_check(check: &DoctorCheck) {
    let prefix = match check.status {
        CheckStatus::Ok => "[OK]",
        CheckStatus::Warn => "[WARN]",
        CheckStatus::Fail => "[FAIL]",
    };
    println!("{} {}", prefix, check.message);
    if let Some(fix) = &check.fix {
        println!("       {fix}");
    }
}

/// Names of the checks that failed. Warnings do not count.
#[must_use]
pub fn failed(checks: &[DoctorCheck]) -> Vec<String> {
    checks
        .iter()
        .filter(|c| c.status == CheckStatus::Fail)
        .map(|c| c.name.clone())
        .collect()
}

/// Run every environment check for `config`.
#[must_use]
pub fn checks(config: &CollatorConfig) -> Vec<DoctorCheck> {
    let mut checks = vec![check_os(std::env::consts::OS)];

    for mount in &config.doctor.required_mounts {
        checks.push(check_mount(mount));
    }

    checks.push(check_dir("reviewed", &config.paths.reviewed));
    checks.push(check_dir("finished", &config.paths.finished));
    if config.collate.copy_to_billing {
        checks.push(check_dir("billing", &config.paths.billing));
    }
    if config.collate.relocate {
        checks.push(check_trash(config.paths.trash_dir().as_deref()));
    }
    for c in &config.collections {
        checks.push(check_dir(&format!("collection {}", c.name), &c.path));
    }

    checks.push(check_tool(&config.render.program, &["--version"]));
    checks
}

/// Check the environment and print the result.
///
/// Returns `true` when no check failed.
pub fn run(config: &CollatorConfig, format: OutputFormat) -> Result<bool> {
    let checks = checks(config);
    let all_ok = failed(&checks).is_empty();

    match format {
        OutputFormat::Json => {
            let envelope = DoctorEnvelope {
                checks: &checks,
                all_ok,
            };
            println!("{}", format.serialize(&envelope)?);
        }
        OutputFormat::Text => {
            println!("collator doctor");
            println!("===============");
            println!();

            for check in &checks {
                print_check(check);
            }

            println!();
            if all_ok {
                println!("All checks passed!");
            } else {
                println!("Some checks failed. See above for details.");
            }
        }
    }

    Ok(all_ok)
}

/// The collator is run on the lab's Macs, where the shares are mounted
/// under `/Volumes`. Elsewhere it works but paths will need adjusting.
fn check_os(os: &str) -> DoctorCheck {
    if os == "macos" {
        DoctorCheck::ok("os", "os: macOS".to_owned())
    } else {
        DoctorCheck::warn(
            "os",
            format!("os: {os} (collator is set up for macOS)"),
            Some("Check that the paths in collator.toml exist on this machine".to_owned()),
        )
    }
}

fn check_mount(mount: &Path) -> DoctorCheck {
    let name = format!("mount {}", mount.display());
    if mount.is_dir() {
        DoctorCheck::ok(&name, format!("{name}: mounted"))
    } else {
        DoctorCheck::fail(
            &name,
            format!("{name}: not mounted"),
            "Connect to the server in Finder (Go > Connect to Server), then run again".to_owned(),
        )
    }
}

fn check_dir(name: &str, path: &Path) -> DoctorCheck {
    if path.is_dir() {
        DoctorCheck::ok(name, format!("{name}: {}", path.display()))
    } else if path.exists() {
        DoctorCheck::fail(
            name,
            format!("{name}: {} is not a directory", path.display()),
            "Fix the path in collator.toml".to_owned(),
        )
    } else {
        DoctorCheck::fail(
            name,
            format!("{name}: {} does not exist", path.display()),
            "Create the folder, mount its share, or fix the path in collator.toml".to_owned(),
        )
    }
}

fn check_trash(trash: Option<&Path>) -> DoctorCheck {
    match trash {
        Some(path) => check_dir("trash", path),
        None => DoctorCheck::fail(
            "trash",
            "trash: no trash folder configured and $HOME is not set".to_owned(),
            "Set paths.trash in collator.toml, or set [collate] relocate = false".to_owned(),
        ),
    }
}

fn check_tool(name: &str, args: &[&str]) -> DoctorCheck {
    let label = format!("renderer {name}");
    match Command::new(name).args(args).output() {
        Ok(output) if output.status.success() => {
            let version = String::from_utf8_lossy(&output.stdout);
            let version = version.lines().next().unwrap_or("unknown").trim();
            DoctorCheck::ok(&label, format!("{label}: {version}"))
        }
        Ok(_) => DoctorCheck::fail(
            &label,
            format!("{label}: found but returned error"),
            "Reinstall it, or point render.program at a working copy".to_owned(),
        ),
        Err(_) => DoctorCheck::fail(
            &label,
            format!("{label}: not found"),
            format!("Install: brew install {name}"),
        ),
    }
}
