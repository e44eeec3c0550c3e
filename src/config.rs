//! Collator configuration (`collator.toml`).
//!
//! Defines where page scans, CoC collections, finished reports and the
//! billing copy live, how the renderer is invoked, and how incomplete
//! ranges are handled.
//!
//! ```toml
//! [paths]
//! reviewed = "/Volumes/Data/Reviewed Reports"
//! finished = "/Volumes/Data/Finished Reports"
//! billing  = "/Volumes/Admin/Billing"
//!
//! [[collections]]
//! name = "austin"
//! path = "/Volumes/scans/Austin CoCs"
//!
//! [[collections]]
//! name = "corpus"
//! path = "/Volumes/scans/Corpus CoCs"
//!
//! [collate]
//! on_incomplete = "prompt"
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "COLLATOR_CONFIG";

/// Config file used when neither `--config` nor [`CONFIG_ENV`] is given.
pub const DEFAULT_CONFIG_FILE: &str = "collator.toml";

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level collator configuration.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CollatorConfig {
    /// Working directories.
    pub paths: PathsConfig,

    /// CoC collections, in lookup order.
    #[serde(default)]
    pub collections: Vec<CollectionConfig>,

    /// Renderer invocation.
    #[serde(default)]
    pub render: RenderConfig,

    /// Run behaviour.
    #[serde(default)]
    pub collate: CollateConfig,

    /// Environment checks.
    #[serde(default)]
    pub doctor: DoctorConfig,
}

// ---------------------------------------------------------------------------
// PathsConfig
// ---------------------------------------------------------------------------

/// Directories the collator reads from and writes to.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PathsConfig {
    /// Reviewed single-page scans awaiting collation.
    pub reviewed: PathBuf,
    /// Where rendered reports are written.
    pub finished: PathBuf,
    /// Where rendered reports are copied after a run.
    pub billing: PathBuf,
    /// Where consumed pages and CoCs are moved. Defaults to `~/.Trash`.
    pub trash: Option<PathBuf>,
}

impl PathsConfig {
    /// The trash directory, falling back to `$HOME/.Trash`.
    #[must_use]
    pub fn trash_dir(&self) -> Option<PathBuf> {
        self.trash
            .clone()
            .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".Trash")))
    }
}

// ---------------------------------------------------------------------------
// CollectionConfig
// ---------------------------------------------------------------------------

/// One CoC source directory.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CollectionConfig {
    /// Short name shown in reports.
    pub name: String,
    /// Directory holding the CoC PDFs.
    pub path: PathBuf,
}

// ---------------------------------------------------------------------------
// RenderConfig
// ---------------------------------------------------------------------------

/// External renderer settings. Defaults drive Ghostscript's `pdfwrite`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RenderConfig {
    /// Program to run (default `"gs"`).
    #[serde(default = "default_render_program")]
    pub program: String,

    /// Arguments placed before the output flag.
    #[serde(default = "default_render_args")]
    pub args: Vec<String>,

    /// Flag the output path is appended to (default `"-sOutputFile="`).
    #[serde(default = "default_output_flag")]
    pub output_flag: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            program: default_render_program(),
            args: default_render_args(),
            output_flag: default_output_flag(),
        }
    }
}

fn default_render_program() -> String {
    "gs".to_owned()
}

fn default_render_args() -> Vec<String> {
    [
        "-q",
        "-dBATCH",
        "-dNOPAUSE",
        "-sDEVICE=pdfwrite",
        "-dAutoRotatePages=/PageByPage",
    ]
    .iter()
    .map(|s| (*s).to_owned())
    .collect()
}

fn default_output_flag() -> String {
    "-sOutputFile=".to_owned()
}

// ---------------------------------------------------------------------------
// CollateConfig
// ---------------------------------------------------------------------------

/// Run behaviour settings.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CollateConfig {
    /// What to do with a report whose range is only partly present.
    #[serde(default)]
    pub on_incomplete: OnIncomplete,

    /// Move consumed pages and CoCs to the trash after rendering.
    #[serde(default = "default_true")]
    pub relocate: bool,

    /// Copy rendered reports into the billing directory.
    #[serde(default = "default_true")]
    pub copy_to_billing: bool,
}

impl Default for CollateConfig {
    fn default() -> Self {
        Self {
            on_incomplete: OnIncomplete::default(),
            relocate: true,
            copy_to_billing: true,
        }
    }
}

const fn default_true() -> bool {
    true
}

/// Policy for reports with missing range members.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum OnIncomplete {
    /// Ask on the terminal whether to skip the report.
    #[default]
    Prompt,
    /// Skip the report and leave its files in place.
    Skip,
    /// Collate whatever pages were found.
    Collate,
}

impl fmt::Display for OnIncomplete {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Prompt => write!(f, "prompt"),
            Self::Skip => write!(f, "skip"),
            Self::Collate => write!(f, "collate"),
        }
    }
}

// ---------------------------------------------------------------------------
// DoctorConfig
// ---------------------------------------------------------------------------

/// Environment check settings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DoctorConfig {
    /// Mount points that must exist (e.g. `"/Volumes/Data"`).
    #[serde(default)]
    pub required_mounts: Vec<PathBuf>,
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Error loading a collator configuration file.
#[derive(Debug)]
pub struct ConfigError {
    /// The path that was being loaded (if available).
    pub path: Option<PathBuf>,
    /// Human-readable message with line-level detail when possible.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(p) = &self.path {
            write!(f, "{}: {}", p.display(), self.message)
        } else {
            write!(f, "config error: {}", self.message)
        }
    }
}

impl std::error::Error for ConfigError {}

impl CollatorConfig {
    /// Resolve the config path: explicit flag, then [`CONFIG_ENV`], then
    /// [`DEFAULT_CONFIG_FILE`] in the current directory.
    #[must_use]
    pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
        explicit.map_or_else(
            || {
                std::env::var_os(CONFIG_ENV)
                    .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE), PathBuf::from)
            },
            Path::to_path_buf,
        )
    }

    /// Load and validate configuration from a TOML file.
    ///
    /// # Errors
    /// Returns `ConfigError` if the file cannot be read, is not valid TOML,
    /// has unknown fields, or fails [`CollatorConfig::validate`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError {
            path: Some(path.to_owned()),
            message: format!("could not read file: {e}"),
        })?;
        Self::parse(&contents).map_err(|mut e| {
            e.path = Some(path.to_owned());
            e
        })
    }

    /// Parse and validate configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `ConfigError` on invalid TOML, unknown fields, or failed
    /// validation.
    pub fn parse(toml_str: &str) -> Result<Self, ConfigError> {
        let cfg: Self = toml::from_str(toml_str).map_err(|e| {
            let mut message = e.message().to_owned();
            if let Some(span) = e.span() {
                let line = toml_str[..span.start]
                    .chars()
                    .filter(|&c| c == '\n')
                    .count()
                    + 1;
                message = format!("line {line}: {message}");
            }
            ConfigError {
                path: None,
                message,
            }
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check cross-field rules serde cannot express.
    ///
    /// # Errors
    /// Returns `ConfigError` when no collection is configured, a collection
    /// name is empty or repeated, or the renderer program is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fail = |message: String| {
            Err(ConfigError {
                path: None,
                message,
            })
        };

        if self.collections.is_empty() {
            return fail("at least one [[collections]] entry is required".to_owned());
        }
        for (i, c) in self.collections.iter().enumerate() {
            if c.name.trim().is_empty() {
                return fail(format!("collections[{i}]: name must not be empty"));
            }
            if self.collections[..i].iter().any(|prev| prev.name == c.name) {
                return fail(format!("collections[{i}]: duplicate name '{}'", c.name));
            }
        }
        if self.render.program.trim().is_empty() {
            return fail("render.program must not be empty".to_owned());
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
[paths]
reviewed = "/data/reviewed"
finished = "/data/finished"
billing = "/admin/billing"

[[collections]]
name = "austin"
path = "/scans/austin"
"#;

    #[test]
    fn minimal_config_uses_defaults() {
        let cfg = CollatorConfig::parse(MINIMAL).unwrap();
        assert_eq!(cfg.paths.reviewed, PathBuf::from("/data/reviewed"));
        assert_eq!(cfg.collections.len(), 1);
        assert_eq!(cfg.render.program, "gs");
        assert_eq!(cfg.render.output_flag, "-sOutputFile=");
        assert!(cfg.render.args.iter().any(|a| a == "-sDEVICE=pdfwrite"));
        assert_eq!(cfg.collate.on_incomplete, OnIncomplete::Prompt);
        assert!(cfg.collate.relocate);
        assert!(cfg.collate.copy_to_billing);
        assert!(cfg.doctor.required_mounts.is_empty());
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
[paths]
reviewed = "/data/reviewed"
finished = "/data/finished"
billing = "/admin/billing"
trash = "/tmp/trash"

[[collections]]
name = "austin"
path = "/scans/austin"

[[collections]]
name = "corpus"
path = "/scans/corpus"

[[collections]]
name = "pt"
path = "/scans/pt"

[render]
program = "/usr/local/bin/gs"
args = ["-q", "-dBATCH"]
output_flag = "-o"

[collate]
on_incomplete = "skip"
relocate = false
copy_to_billing = false

[doctor]
required_mounts = ["/Volumes/Data", "/Volumes/scans"]
"#;
        let cfg = CollatorConfig::parse(toml).unwrap();
        let names: Vec<&str> = cfg.collections.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["austin", "corpus", "pt"]);
        assert_eq!(cfg.paths.trash_dir(), Some(PathBuf::from("/tmp/trash")));
        assert_eq!(cfg.render.args, ["-q", "-dBATCH"]);
        assert_eq!(cfg.render.output_flag, "-o");
        assert_eq!(cfg.collate.on_incomplete, OnIncomplete::Skip);
        assert!(!cfg.collate.relocate);
        assert_eq!(cfg.doctor.required_mounts.len(), 2);
    }

    #[test]
    fn unknown_field_reports_line() {
        let toml = format!("{MINIMAL}\n[collate]\nbogus = 1\n");
        let err = CollatorConfig::parse(&toml).unwrap_err();
        assert!(err.message.starts_with("line "), "{}", err.message);
        assert!(err.message.contains("bogus"));
    }

    #[test]
    fn missing_paths_is_an_error() {
        let err = CollatorConfig::parse("[[collections]]\nname = \"a\"\npath = \"/a\"\n").unwrap_err();
        assert!(err.message.contains("paths"), "{}", err.message);
    }

    #[test]
    fn requires_a_collection() {
        let toml = MINIMAL.replace("[[collections]]\nname = \"austin\"\npath = \"/scans/austin\"\n", "");
        let err = CollatorConfig::parse(&toml).unwrap_err();
        assert!(err.message.contains("at least one"));
    }

    #[test]
    fn rejects_duplicate_collection_names() {
        let toml = format!("{MINIMAL}\n[[collections]]\nname = \"austin\"\npath = \"/other\"\n");
        let err = CollatorConfig::parse(&toml).unwrap_err();
        assert!(err.message.contains("duplicate name 'austin'"));
    }

    #[test]
    fn invalid_policy_is_rejected() {
        let toml = format!("{MINIMAL}\n[collate]\non_incomplete = \"maybe\"\n");
        assert!(CollatorConfig::parse(&toml).is_err());
    }

    #[test]
    fn load_missing_file_names_path() {
        let err = CollatorConfig::load(Path::new("/nonexistent/collator.toml")).unwrap_err();
        assert_eq!(err.path, Some(PathBuf::from("/nonexistent/collator.toml")));
        assert!(err.to_string().contains("could not read file"));
    }

    #[test]
    fn explicit_path_wins() {
        let p = CollatorConfig::resolve_path(Some(Path::new("/etc/collator.toml")));
        assert_eq!(p, PathBuf::from("/etc/collator.toml"));
    }
}
