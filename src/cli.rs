//! CLI argument parsing and command dispatch

use std::io::{self, IsTerminal, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::debug;

use roots::cancel::CancellationToken;
use roots::config::{
    default_system_root, default_workers, AncestorPattern, MarkerSequence, SearchConfig,
    DEFAULT_DEPTH, DEFAULT_IGNORE_DIRS, DEFAULT_PARENT,
};
use roots::explorer::{ExploreMode, Explorer};
use roots::filesystem::OsFileSystem;
use roots::path::absolutize;

fn default_ignore_dirs() -> Vec<String> {
    DEFAULT_IGNORE_DIRS.iter().map(|d| d.to_string()).collect()
}

/// roots is a tool for exploring multiple root directories, such as those in
/// a monorepo project.
///
/// The base directory is DIR, or each line of stdin when it is not a
/// terminal, or the current directory.
#[derive(Parser, Debug)]
#[command(name = "roots")]
#[command(version)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Base directory to explore from
    #[arg(value_name = "DIR")]
    dir: Option<PathBuf>,

    /// Depth for exploring directories
    #[arg(short, long, value_name = "N", default_value_t = DEFAULT_DEPTH)]
    depth: usize,

    /// Number of parent root directories to explore
    #[arg(short, long, value_name = "N", default_value_t = DEFAULT_PARENT)]
    parent: usize,

    /// File or directory that exists in the root directory (e.g. .git/config)
    #[arg(long = "root-file", value_name = "PATH", value_delimiter = ',')]
    root_files: Vec<MarkerSequence>,

    /// Directory to ignore
    #[arg(
        long = "ignore-dir",
        value_name = "NAME",
        value_delimiter = ',',
        default_values_t = default_ignore_dirs()
    )]
    ignore_dirs: Vec<String>,

    /// Directory that exists as a parent directory of the root directory
    #[arg(long = "parent-dir", value_name = "PATH", value_delimiter = ',')]
    parent_dirs: Vec<AncestorPattern>,

    /// Explore multiple base directories in parallel
    #[arg(long)]
    fast: bool,

    /// Number of worker threads (default: twice the number of CPUs)
    #[arg(short, long, value_name = "N")]
    jobs: Option<usize>,

    /// Filesystem root every path is resolved against
    #[arg(long, value_name = "DIR", env = "ROOTS_SYSTEM_ROOT")]
    system_root: Option<PathBuf>,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate shell completion scripts
    Completion {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: CompletionShell,
    },
}

/// Shell types for completion generation
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CompletionShell {
    /// Bourne Again Shell
    Bash,
    /// Z Shell
    Zsh,
    /// Fish Shell
    Fish,
    /// PowerShell
    #[value(name = "powershell")]
    PowerShell,
    /// Elvish Shell
    Elvish,
}

impl From<CompletionShell> for Shell {
    fn from(shell: CompletionShell) -> Self {
        match shell {
            CompletionShell::Bash => Shell::Bash,
            CompletionShell::Zsh => Shell::Zsh,
            CompletionShell::Fish => Shell::Fish,
            CompletionShell::PowerShell => Shell::PowerShell,
            CompletionShell::Elvish => Shell::Elvish,
        }
    }
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        env_logger::Builder::from_env(
            env_logger::Env::default().default_filter_or(self.log_level.as_str()),
        )
        .init();

        match self.command {
            Some(Commands::Completion { shell }) => {
                let mut cmd = Cli::command();
                generate(Shell::from(shell), &mut cmd, "roots", &mut io::stdout());
                Ok(())
            }
            None => self.explore(),
        }
    }

    fn explore(self) -> Result<()> {
        let system_root = self.system_root.clone().unwrap_or_else(default_system_root);
        let cwd = std::env::current_dir().context("Failed to get current directory")?;
        let base_dirs = self.base_dirs(&cwd)?;
        let config = self.search_config(system_root);
        debug!("Exploring {} base director(ies) with {:?}", base_dirs.len(), config);

        let fs = Arc::new(OsFileSystem::new(config.system_root.clone()));
        let mode = if self.fast {
            ExploreMode::Parallel
        } else {
            ExploreMode::Sequential
        };
        let explorer = Explorer::new(fs, config)?;

        explorer.explore_many(
            &CancellationToken::new(),
            &base_dirs,
            mode,
            |_, roots| {
                let mut stdout = io::stdout().lock();
                for root in roots {
                    writeln!(stdout, "{}", root.display())
                        .map_err(|e| roots::error::Error::io("<stdout>", e))?;
                }
                Ok(())
            },
        )?;
        Ok(())
    }

    fn search_config(&self, system_root: PathBuf) -> SearchConfig {
        let mut config = SearchConfig::new()
            .with_system_root(system_root)
            .with_depth(self.depth)
            .with_parent(self.parent)
            .with_parent_dirs(self.parent_dirs.clone())
            .with_ignore_dirs(self.ignore_dirs.iter().filter(|d| !d.is_empty()).cloned())
            .with_workers(self.jobs.unwrap_or_else(default_workers));
        if !self.root_files.is_empty() {
            config = config.with_root_files(self.root_files.clone());
        }
        config
    }

    /// Base directories: the positional argument, else stdin lines when
    /// stdin is not a terminal, else the current directory.
    fn base_dirs(&self, cwd: &Path) -> Result<Vec<PathBuf>> {
        if let Some(dir) = &self.dir {
            return Ok(vec![absolutize(cwd, dir)]);
        }

        let stdin = io::stdin();
        if !stdin.is_terminal() {
            let mut input = String::new();
            stdin
                .lock()
                .read_to_string(&mut input)
                .context("Failed to read base directories from stdin")?;
            let dirs = parse_base_dirs(cwd, &input);
            if !dirs.is_empty() {
                return Ok(dirs);
            }
        }

        Ok(vec![cwd.to_path_buf()])
    }
}

/// One base directory per non-blank line
fn parse_base_dirs(cwd: &Path, input: &str) -> Vec<PathBuf> {
    input
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| absolutize(cwd, Path::new(line)))
        .collect()
}
