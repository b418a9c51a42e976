//! # Search Configuration
//!
//! This module defines the immutable configuration consumed by the explorer:
//! the system-root prefix, the descent depth, the ancestor-climb budget, the
//! marker sequences that identify a root, the ancestor-name patterns, the
//! ignore directory set and the size of the search pool.
//!
//! ## Defaults
//!
//! | Setting | Default |
//! |---|---|
//! | depth | 3 |
//! | parent | 2 |
//! | marker sequences | `.git/config`, `go.mod`, `package.json`, `Cargo.toml` |
//! | ignore directories | `node_modules`, `vendor`, `testdata` |
//! | ancestor-name patterns | none |
//! | workers | twice the available parallelism |
//!
//! Patterns are written as `/`-separated strings on the command line and
//! parsed with [`FromStr`].

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{Error, Result};

/// Default descent depth below the anchor
pub const DEFAULT_DEPTH: usize = 3;

/// Default number of ancestor matches to climb through
pub const DEFAULT_PARENT: usize = 2;

/// Marker paths whose presence identifies a project root
pub const DEFAULT_ROOT_FILES: &[&[&str]] = &[
    // Git repository
    &[".git", "config"],
    // Go module
    &["go.mod"],
    // Node.js package
    &["package.json"],
    // Rust crate
    &["Cargo.toml"],
];

/// Directory names never descended into
pub const DEFAULT_IGNORE_DIRS: &[&str] = &["node_modules", "vendor", "testdata"];

/// Environment variable holding the Windows system drive
pub const SYSTEM_DRIVE_ENV: &str = "SystemDrive";

fn split_components(input: &str) -> Vec<String> {
    input
        .split(|c| c == '/' || c == std::path::MAIN_SEPARATOR)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

/// An ordered sequence of path components that must exist below a
/// directory for it to be a root, e.g. `[".git", "config"]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MarkerSequence(Vec<String>);

impl MarkerSequence {
    pub fn new<S: Into<String>>(components: impl IntoIterator<Item = S>) -> Result<Self> {
        let components: Vec<String> = components.into_iter().map(Into::into).collect();
        if components.is_empty() || components.iter().any(|c| c.is_empty()) {
            return Err(Error::InvalidConfig {
                message: "marker sequence must have non-empty components".to_string(),
            });
        }
        Ok(Self(components))
    }

    pub fn components(&self) -> &[String] {
        &self.0
    }
}

impl FromStr for MarkerSequence {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(split_components(s))
    }
}

impl fmt::Display for MarkerSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("/"))
    }
}

/// A sequence of path components compared as a suffix against a candidate
/// directory's parent path, e.g. `["pkg"]` makes every directory living
/// directly under `.../pkg` a root.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AncestorPattern {
    components: Vec<String>,
    joined: PathBuf,
}

impl AncestorPattern {
    pub fn new<S: Into<String>>(components: impl IntoIterator<Item = S>) -> Result<Self> {
        let components: Vec<String> = components.into_iter().map(Into::into).collect();
        if components.is_empty() || components.iter().any(|c| c.is_empty()) {
            return Err(Error::InvalidConfig {
                message: "ancestor pattern must have non-empty components".to_string(),
            });
        }
        let joined = components.iter().collect::<PathBuf>();
        Ok(Self { components, joined })
    }

    pub fn components(&self) -> &[String] {
        &self.components
    }

    /// The components joined into one path
    pub fn joined(&self) -> &Path {
        &self.joined
    }
}

impl FromStr for AncestorPattern {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(split_components(s))
    }
}

impl fmt::Display for AncestorPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.components.join("/"))
    }
}

/// Default worker count for the search pool
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        * 2
}

/// Default system-root prefix: the Windows system drive when the
/// `SystemDrive` variable is set, `/` otherwise.
pub fn default_system_root() -> PathBuf {
    match std::env::var(SYSTEM_DRIVE_ENV) {
        Ok(drive) if !drive.is_empty() => PathBuf::from(format!("{}\\", drive)),
        _ => PathBuf::from("/"),
    }
}

/// Immutable configuration of one explorer
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Prefix every explored path is relative to
    pub system_root: PathBuf,
    /// Number of directory levels visited below and including the anchor
    pub depth: usize,
    /// Number of ancestor matches to climb through. With 0 the climb only
    /// continues past the base when the base is itself a root.
    pub parent: usize,
    pub root_files: Vec<MarkerSequence>,
    pub parent_dirs: Vec<AncestorPattern>,
    pub ignore_dirs: BTreeSet<String>,
    /// Size of the search pool
    pub workers: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            system_root: PathBuf::from("/"),
            depth: DEFAULT_DEPTH,
            parent: DEFAULT_PARENT,
            root_files: DEFAULT_ROOT_FILES
                .iter()
                .map(|components| MarkerSequence(components.iter().map(|c| c.to_string()).collect()))
                .collect(),
            parent_dirs: Vec::new(),
            ignore_dirs: DEFAULT_IGNORE_DIRS.iter().map(|d| d.to_string()).collect(),
            workers: default_workers(),
        }
    }
}

impl SearchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_system_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.system_root = root.into();
        self
    }

    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_parent(mut self, parent: usize) -> Self {
        self.parent = parent;
        self
    }

    pub fn with_root_files(mut self, root_files: Vec<MarkerSequence>) -> Self {
        self.root_files = root_files;
        self
    }

    pub fn with_parent_dirs(mut self, parent_dirs: Vec<AncestorPattern>) -> Self {
        self.parent_dirs = parent_dirs;
        self
    }

    pub fn with_ignore_dirs<S: Into<String>>(mut self, dirs: impl IntoIterator<Item = S>) -> Self {
        self.ignore_dirs = dirs.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Whether a bare directory name is in the ignore set
    pub fn is_ignored_dir(&self, name: &str) -> bool {
        self.ignore_dirs.contains(name)
    }

    /// Reject configurations the explorer cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(Error::InvalidConfig {
                message: "worker count must be at least 1".to_string(),
            });
        }
        if self.root_files.is_empty() && self.parent_dirs.is_empty() {
            return Err(Error::InvalidConfig {
                message: "at least one root file or parent directory pattern is required"
                    .to_string(),
            });
        }
        Ok(())
    }
}
