//! Shared helpers for integration tests.

use assert_cmd::prelude::*;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tempfile::TempDir;

/// A scratch directory holding profile artifacts.
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    #[must_use]
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("create temp dir"),
        }
    }

    /// Write `text` to `name` inside the workspace and return its path.
    pub fn profile(&self, name: &str, text: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, text).expect("write profile");
        path
    }

    #[must_use]
    pub fn read(&self, name: &str) -> String {
        fs::read_to_string(self.dir.path().join(name)).expect("read profile")
    }

    #[must_use]
    pub fn exists(&self, name: &str) -> bool {
        self.dir.path().join(name).exists()
    }

    /// Build a `covmerge` command running inside the workspace.
    #[must_use]
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("covmerge").expect("binary");
        cmd.current_dir(self.dir.path())
            .env_remove("RUST_LOG")
            .env_remove("COVMERGE_CONFIG_PATH");
        cmd
    }
}
