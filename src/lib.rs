//! # Roots Library
//!
//! This library locates "project root" directories: directories that hold
//! one of a configured set of marker paths such as `.git/config`, `go.mod`
//! or `package.json`. It is used to find the package boundaries of a
//! monorepo from an arbitrary working directory, and backs the `roots`
//! command-line tool.
//!
//! ## Quick Example
//!
//! ```
//! use std::path::{Path, PathBuf};
//! use std::sync::Arc;
//!
//! use roots::cancel::CancellationToken;
//! use roots::config::SearchConfig;
//! use roots::explorer::Explorer;
//! use roots::filesystem::MemoryFS;
//!
//! // Create an in-memory filesystem
//! let mut fs = MemoryFS::new();
//! fs.touch("path/to/dir/.git/config").unwrap();
//! fs.touch("path/to/dir/pkg/foo/package.json").unwrap();
//! fs.touch("path/to/dir/node_modules/baz/package.json").unwrap();
//!
//! let explorer = Explorer::new(Arc::new(fs), SearchConfig::default()).unwrap();
//! let roots = explorer
//!     .explore_roots(&CancellationToken::new(), Path::new("/path/to/dir"))
//!     .unwrap();
//!
//! // node_modules is in the default ignore set
//! assert_eq!(
//!     roots,
//!     vec![PathBuf::from("path/to/dir"), PathBuf::from("path/to/dir/pkg/foo")]
//! );
//! ```
//!
//! ## Core Concepts
//!
//! - **Filesystem view (`filesystem`)**: a read-only filesystem addressed
//!   relative to a system root, either on disk or in memory.
//! - **Pattern matcher (`matcher`)**: decides whether a directory is a root,
//!   by marker files or by the name of its parent directory.
//! - **Gitignore cache (`gitignore`)**: memoized, inherited `.gitignore`
//!   rules used to prune ignored directories.
//! - **Ancestor walk (`ancestor`)**: climbs from the base directory to the
//!   anchor the search starts from.
//! - **Descendant search (`search`)**: depth-bounded, parallel search for
//!   roots below the anchor.
//! - **Explorer (`explorer`)**: wires everything together per base
//!   directory.
//!
//! ## Execution Flow
//!
//! 1.  **Resolve**: express the base directory relative to the system root.
//! 2.  **Climb**: walk up to the anchor, passing through `parent` matches.
//! 3.  **Descend**: visit up to `depth` levels from the anchor in parallel,
//!     skipping ignored directories.
//! 4.  **Merge**: de-duplicate and sort the roots found.

pub mod ancestor;
pub mod cancel;
pub mod config;
pub mod error;
pub mod explorer;
pub mod filesystem;
pub mod gitignore;
pub mod matcher;
pub mod path;
pub mod search;

#[cfg(test)]
mod search_proptest;
