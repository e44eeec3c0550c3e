//! Invocation of the external PDF renderer.
//!
//! The collator never touches PDF content. It hands an ordered list of
//! inputs (pages, then the CoC) and an output path to a [`Renderer`].

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use thiserror::Error;

use crate::config::RenderConfig;

/// Renderer failure.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The program could not be started.
    #[error("could not start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The program ran but reported failure.
    #[error("`{program}` exited with {}{}", code.map_or_else(|| "a signal".to_owned(), |c| format!("code {c}")), stderr_suffix(stderr))]
    Failed {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    /// The program reported success but wrote nothing.
    #[error("`{program}` exited cleanly but {} was not written", output.display())]
    NoOutput { program: String, output: PathBuf },
}

fn stderr_suffix(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {trimmed}")
    }
}

/// Merges input PDFs into one output document.
pub trait Renderer {
    /// Render `inputs`, in order, into `output`.
    ///
    /// # Errors
    /// Returns a [`RenderError`] if the document was not produced.
    fn render(&self, inputs: &[PathBuf], output: &Path) -> Result<(), RenderError>;
}

/// Renders by running an external program, Ghostscript by default:
///
/// ```text
/// gs -q -dBATCH -dNOPAUSE -sDEVICE=pdfwrite -dAutoRotatePages=/PageByPage \
///    -sOutputFile=<output> <page>... <coc>
/// ```
#[derive(Clone, Debug)]
pub struct CommandRenderer {
    program: String,
    args: Vec<String>,
    output_flag: String,
}

impl CommandRenderer {
    #[must_use]
    pub fn from_config(cfg: &RenderConfig) -> Self {
        Self {
            program: cfg.program.clone(),
            args: cfg.args.clone(),
            output_flag: cfg.output_flag.clone(),
        }
    }

    /// The full argument list for one render.
    #[must_use]
    pub fn command_args(&self, inputs: &[PathBuf], output: &Path) -> Vec<String> {
        let mut args = self.args.clone();
        args.push(format!("{}{}", self.output_flag, output.display()));
        args.extend(inputs.iter().map(|p| p.display().to_string()));
        args
    }
}

impl Renderer for CommandRenderer {
    fn render(&self, inputs: &[PathBuf], output: &Path) -> Result<(), RenderError> {
        let args = self.command_args(inputs, output);
        tracing::debug!(program = %self.program, ?args, "running renderer");

        let out = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| RenderError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !out.status.success() {
            return Err(RenderError::Failed {
                program: self.program.clone(),
                code: out.status.code(),
                stderr: String::from_utf8_lossy(&out.stderr).into_owned(),
            });
        }
        if !output.exists() {
            return Err(RenderError::NoOutput {
                program: self.program.clone(),
                output: output.to_owned(),
            });
        }
        Ok(())
    }
}
