//! Shared test infrastructure for integration tests.
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Scratch directory holding grid, config, and report files for one test.
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("temp dir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.path(name);
        fs::write(&path, contents).expect("write fixture");
        path
    }

    pub fn read(&self, name: &str) -> String {
        fs::read_to_string(self.path(name)).expect("read output")
    }

    /// Write a config file pointing at `endpoint` and return its path.
    pub fn config_for(&self, endpoint: &str) -> PathBuf {
        let config = serde_json::json!({
            "schema_version": 1,
            "endpoint": endpoint,
            "timeout_ms": 5000,
        });
        self.write("config.json", &config.to_string())
    }

    /// Run the gridfill binary with an isolated environment.
    ///
    /// `HOME` and `XDG_CONFIG_HOME` point into the workspace so a developer's
    /// own config file is never picked up.
    pub fn run<I, S>(&self, args: I) -> Output
    where
        I: IntoIterator<Item = S>,
        S: AsRef<std::ffi::OsStr>,
    {
        Command::new(env!("CARGO_BIN_EXE_gridfill"))
            .args(args)
            .current_dir(self.root())
            .env("HOME", self.root())
            .env("XDG_CONFIG_HOME", self.root())
            .env_remove("GRIDFILL_API_URL")
            .env_remove("GRIDFILL_TIMEOUT_MS")
            .env_remove("RUST_LOG")
            .output()
            .expect("run gridfill")
    }
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// Panic with stderr attached when the command failed.
pub fn assert_success(output: &Output) {
    assert!(
        output.status.success(),
        "gridfill failed: {}",
        stderr(output)
    );
}
