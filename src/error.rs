//! # Error Handling
//!
//! This module defines the centralized error type for the `roots` library.
//! It uses the `thiserror` library to create an `Error` enum covering every
//! condition that can end an exploration.
//!
//! ## Error Classes
//!
//! - **Fatal input errors**: the base directory is missing, is not a
//!   directory, cannot be stat-ed, or lies outside the system root
//!   (`Io`, `NotADirectory`, `InvalidPath`).
//! - **Configuration errors**: empty marker or ancestor patterns, a zero
//!   worker count, or a pool that cannot be built (`InvalidConfig`,
//!   `ThreadPool`).
//! - **Not found**: no root located within the climb budget and search
//!   depth (`RootNotFound`). This is a structured miss, not a crash.
//! - **Cancellation**: the shared cancellation token was triggered while the
//!   exploration was running (`Cancelled`).
//!
//! Conditions met while descending below the anchor (an unlistable
//! subdirectory, an unreadable `.gitignore`) are never turned into errors.
//! They are logged and the affected subtree is treated as empty.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for root exploration
#[derive(Error, Debug)]
pub enum Error {
    /// A filesystem operation on a path that must exist failed.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The base directory exists but is not a directory.
    #[error("{} is not a directory", path.display())]
    NotADirectory { path: PathBuf },

    /// The base directory cannot be expressed relative to the system root.
    #[error("Invalid path {}: {message}", path.display())]
    InvalidPath { path: PathBuf, message: String },

    /// The search configuration is unusable.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// The worker pool could not be created.
    #[error("Thread pool error: {message}")]
    ThreadPool { message: String },

    /// Neither the ancestor walk nor the descendant search found a root.
    #[error("root not found in {}", base_dir.display())]
    RootNotFound { base_dir: PathBuf },

    /// The exploration observed a cancellation request.
    #[error("exploration cancelled")]
    Cancelled,
}

impl Error {
    /// Wrap an I/O error together with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error is the structured "no root found" miss.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::RootNotFound { .. })
    }
}

impl From<rayon::ThreadPoolBuildError> for Error {
    fn from(err: rayon::ThreadPoolBuildError) -> Self {
        Error::ThreadPool {
            message: err.to_string(),
        }
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
