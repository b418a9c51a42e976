//! # Roots CLI
//!
//! This is the binary entry point for the `roots` command-line tool.
//!
//! Its primary responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Resolving the base directories and running the explorer.
//! - Handling top-level application errors and translating them into a
//!   non-zero exit status.
//!
//! The exploration logic lives in the `roots` library crate; the binary is
//! a thin wrapper around it.

mod cli;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
