//! Shared test helpers for collator integration tests.
//!
//! All tests use temp directories. Each [`Lab`] is a fake file server with
//! reviewed/finished/billing/trash folders, two CoC collections and a
//! `collator.toml` pointing at them.

#![allow(dead_code)]

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

/// Renderer stand-in: `sh -c 'cat "$@" > "$0"' <output> <inputs>...`.
pub const CAT_RENDER: &str = r#"
[render]
program = "sh"
args = ["-c", 'cat "$@" > "$0"']
output_flag = ""
"#;

pub struct Lab {
    dir: TempDir,
}

impl Lab {
    /// A lab whose renderer concatenates its inputs.
    pub fn new() -> Self {
        Self::with_config(CAT_RENDER)
    }

    /// A lab with `extra` appended to the base config.
    pub fn with_config(extra: &str) -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        for sub in [
            "reviewed",
            "finished",
            "billing",
            "trash",
            "cocs/austin",
            "cocs/corpus",
        ] {
            std::fs::create_dir_all(dir.path().join(sub)).unwrap();
        }
        let lab = Self { dir };
        lab.write_config(extra);
        lab
    }

    pub fn write_config(&self, extra: &str) {
        let r = self.root().display();
        let base = format!(
            r#"
[paths]
reviewed = '{r}/reviewed'
finished = '{r}/finished'
billing = '{r}/billing'
trash = '{r}/trash'

[[collections]]
name = "austin"
path = '{r}/cocs/austin'

[[collections]]
name = "corpus"
path = '{r}/cocs/corpus'
"#
        );
        std::fs::write(self.root().join("collator.toml"), base + extra).unwrap();
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.root().join(rel)
    }

    pub fn exists(&self, rel: &str) -> bool {
        self.path(rel).exists()
    }

    pub fn read(&self, rel: &str) -> String {
        std::fs::read_to_string(self.path(rel))
            .unwrap_or_else(|e| panic!("failed to read {rel}: {e}"))
    }

    /// Add a CoC whose content is its own name plus a newline.
    pub fn add_coc(&self, collection: &str, name: &str) {
        let path = self.path(&format!("cocs/{collection}/{name}"));
        std::fs::write(path, format!("{name}\n")).unwrap();
    }

    /// Add a reviewed page whose content is its own name plus a newline.
    pub fn add_page(&self, name: &str) {
        std::fs::write(self.path(&format!("reviewed/{name}")), format!("{name}\n")).unwrap();
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_collator"));
        cmd.args(args)
            .current_dir(self.root())
            .env_remove("COLLATOR_CONFIG")
            .env_remove("COLLATOR_LOG_FORMAT")
            .env_remove("RUST_LOG");
        cmd
    }

    /// Run collator with the given args in the lab root.
    pub fn collator_in(&self, args: &[&str]) -> Output {
        self.command(args)
            .output()
            .expect("failed to execute collator")
    }

    /// Run collator with `input` on stdin.
    pub fn collator_with_input(&self, args: &[&str], input: &str) -> Output {
        let mut child = self
            .command(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("failed to spawn collator");
        child
            .stdin
            .take()
            .expect("stdin is piped")
            .write_all(input.as_bytes())
            .unwrap();
        child.wait_with_output().expect("failed to wait for collator")
    }

    /// Run collator and assert it succeeds. Returns stdout as string.
    pub fn collator_ok(&self, args: &[&str]) -> String {
        let out = self.collator_in(args);
        let stderr = String::from_utf8_lossy(&out.stderr);
        let stdout = String::from_utf8_lossy(&out.stdout);
        assert!(
            out.status.success(),
            "collator {} failed:\nstdout: {stdout}\nstderr: {stderr}",
            args.join(" "),
        );
        stdout.to_string()
    }

    /// Run collator and assert it fails. Returns stderr as string.
    pub fn collator_fails(&self, args: &[&str]) -> String {
        let out = self.collator_in(args);
        assert!(
            !out.status.success(),
            "Expected collator {} to fail, but it succeeded.\nstdout: {}",
            args.join(" "),
            String::from_utf8_lossy(&out.stdout),
        );
        String::from_utf8_lossy(&out.stderr).to_string()
    }

    /// Run collator and parse its stdout as JSON, whatever the exit status.
    pub fn collator_json(&self, args: &[&str]) -> serde_json::Value {
        let out = self.collator_in(args);
        serde_json::from_slice(&out.stdout).unwrap_or_else(|e| {
            panic!(
                "collator {} did not print JSON ({e}):\nstdout: {}\nstderr: {}",
                args.join(" "),
                String::from_utf8_lossy(&out.stdout),
                String::from_utf8_lossy(&out.stderr),
            )
        })
    }
}
