//! # Explorer
//!
//! The composition root of the library. For each base directory it
//!
//! 1. resolves the directory relative to the system root,
//! 2. climbs to an anchor with the [`AncestorWalker`],
//! 3. collects roots below the anchor with the [`DescendantSearch`], run on
//!    the explorer's rayon pool.
//!
//! ## Example
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
//! let mut fs = MemoryFS::new();
//! fs.touch("work/mono/.git/config").unwrap();
//! fs.touch("work/mono/apps/web/package.json").unwrap();
//!
//! let explorer = Explorer::new(Arc::new(fs), SearchConfig::default()).unwrap();
//! let roots = explorer
//!     .explore_roots(&CancellationToken::new(), Path::new("/work/mono/apps"))
//!     .unwrap();
//! assert_eq!(
//!     roots,
//!     vec![PathBuf::from("work/mono"), PathBuf::from("work/mono/apps/web")]
//! );
//! ```

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use log::debug;
use rayon::prelude::*;

use crate::ancestor::AncestorWalker;
use crate::cancel::CancellationToken;
use crate::config::SearchConfig;
use crate::error::{Error, Result};
use crate::filesystem::FileSystem;
use crate::gitignore::GitignoreRegistry;
use crate::matcher::RootMatcher;
use crate::path::{relative_to_root, sort_and_dedup};
use crate::search::DescendantSearch;

/// How [`Explorer::explore_many`] schedules several base directories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExploreMode {
    /// One base directory after another, in input order
    #[default]
    Sequential,
    /// All base directories at once; the first failure cancels the rest
    Parallel,
}

/// Finds project roots around base directories
pub struct Explorer {
    fs: Arc<dyn FileSystem>,
    config: SearchConfig,
    pool: rayon::ThreadPool,
}

impl Explorer {
    /// Create an explorer over `fs`, with a search pool of
    /// `config.workers` threads.
    pub fn new(fs: Arc<dyn FileSystem>, config: SearchConfig) -> Result<Self> {
        config.validate()?;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.workers)
            .thread_name(|i| format!("roots-worker-{}", i))
            .build()?;
        Ok(Self { fs, config, pool })
    }

    /// Re-prefix a root path with the system root
    pub fn absolute(&self, root: &Path) -> PathBuf {
        self.config.system_root.join(root)
    }

    /// Explore the roots around one base directory.
    ///
    /// Returned paths are relative to the system root and sorted byte-wise.
    /// Fails with [`Error::RootNotFound`] when no root is found at all.
    pub fn explore_roots(&self, cancel: &CancellationToken, base_dir: &Path) -> Result<Vec<PathBuf>> {
        let base = relative_to_root(&self.config.system_root, base_dir)?;
        let fs = self.fs.as_ref();
        let matcher = RootMatcher::new(fs, &self.config.root_files, &self.config.parent_dirs);
        let gitignores = GitignoreRegistry::new(Arc::clone(&self.fs));

        let walker = AncestorWalker::new(fs, &matcher, &gitignores, self.config.parent);
        let anchor = walker
            .find_anchor(cancel, &base)?
            .ok_or_else(|| Error::RootNotFound {
                base_dir: base_dir.to_path_buf(),
            })?;
        debug!("Exploring {} from anchor {}", base_dir.display(), anchor.display());

        let search = DescendantSearch::new(fs, &self.config, &matcher, &gitignores, cancel);
        let mut roots = self
            .pool
            .install(|| search.explore(&anchor, self.config.depth));

        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        if roots.is_empty() {
            return Err(Error::RootNotFound {
                base_dir: base_dir.to_path_buf(),
            });
        }
        sort_and_dedup(&mut roots);
        Ok(roots)
    }

    /// Explore several base directories, handing each one's roots, prefixed
    /// with the system root, to `on_roots` as soon as they are known.
    ///
    /// The first error wins. In [`ExploreMode::Parallel`] it also cancels
    /// `cancel`, so explorations still in flight stop early; roots already
    /// handed to `on_roots` stay delivered.
    pub fn explore_many<F>(
        &self,
        cancel: &CancellationToken,
        base_dirs: &[PathBuf],
        mode: ExploreMode,
        on_roots: F,
    ) -> Result<()>
    where
        F: Fn(&Path, Vec<PathBuf>) -> Result<()> + Sync,
    {
        let run_one = |base_dir: &PathBuf| -> Result<()> {
            let roots = self.explore_roots(cancel, base_dir)?;
            let roots = roots.iter().map(|root| self.absolute(root)).collect();
            on_roots(base_dir.as_path(), roots)
        };

        match mode {
            ExploreMode::Sequential => base_dirs.iter().try_for_each(run_one),
            ExploreMode::Parallel => {
                let first_error: Mutex<Option<Error>> = Mutex::new(None);
                self.pool.install(|| {
                    base_dirs.par_iter().for_each(|base_dir| {
                        if cancel.is_cancelled() {
                            return;
                        }
                        if let Err(err) = run_one(base_dir) {
                            let mut slot = first_error.lock().unwrap_or_else(PoisonError::into_inner);
                            if slot.is_none() {
                                *slot = Some(err);
                                cancel.cancel();
                            }
                        }
                    })
                });

                match first_error.into_inner().unwrap_or_else(PoisonError::into_inner) {
                    Some(err) => Err(err),
                    None if cancel.is_cancelled() => Err(Error::Cancelled),
                    None => Ok(()),
                }
            }
        }
    }
}
