//! Shared test utilities for integration and E2E tests.
//!
//! This module provides a temporary directory fixture that doubles as the
//! system root of the `roots` binary, so runs never see the host's real
//! directories.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_file("repo/go.mod", "module repo\n");
//!     fixture.command().arg(fixture.real_path("repo")).assert().success();
//! }
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    pub use super::TestFixture;
}

/// A temporary directory used as the system root of a `roots` run.
///
/// Paths given to the helpers are relative to the fixture. The binary
/// reports roots as real paths, so tests compare against `real_path`.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Add a file with the given path and content.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Add an empty marker file, creating its parent directories.
    pub fn with_marker(self, path: &str) -> Self {
        self.with_file(path, "")
    }

    /// Add an empty directory.
    pub fn with_dir(self, path: &str) -> Self {
        self.temp_dir
            .child(path)
            .create_dir_all()
            .expect("Failed to create directory");
        self
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// The real path of `rel` inside the fixture
    pub fn real_path(&self, rel: &str) -> PathBuf {
        self.temp_dir.path().join(rel)
    }

    /// Expected stdout for the given roots, one real path per line
    #[allow(dead_code)]
    pub fn lines(&self, roots: &[&str]) -> String {
        roots
            .iter()
            .map(|root| format!("{}\n", self.real_path(root).display()))
            .collect()
    }

    /// Create a child path in the temp directory.
    #[allow(dead_code)]
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl TestFixture {
    /// Create a command with this fixture as its system root.
    ///
    /// The working directory is the fixture itself and `ROOTS_SYSTEM_ROOT`
    /// is cleared from the inherited environment.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("roots");
        cmd.current_dir(self.path())
            .env_remove("ROOTS_SYSTEM_ROOT")
            .env_remove("RUST_LOG")
            .arg("--system-root")
            .arg(self.path());
        cmd
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_creates_temp_dir() {
        let fixture = TestFixture::new();
        assert!(fixture.path().exists());
    }

    #[test]
    fn test_fixture_with_marker() {
        let fixture = TestFixture::new().with_marker("repo/.git/config");
        assert!(fixture.path().join("repo/.git/config").is_file());
    }

    #[test]
    fn test_fixture_with_dir() {
        let fixture = TestFixture::new().with_dir("a/b");
        assert!(fixture.path().join("a/b").is_dir());
    }

    #[test]
    fn test_lines_are_real_paths() {
        let fixture = TestFixture::new();
        let expected = format!("{}\n", fixture.path().join("repo/pkg").display());
        assert_eq!(fixture.lines(&["repo/pkg"]), expected);
    }
}
