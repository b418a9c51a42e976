//! # Descendant Search
//!
//! Starting at the anchor, the search visits subdirectories down to the
//! configured depth and collects every directory the root predicate accepts.
//!
//! ## Pruning
//!
//! A subdirectory is not descended into when
//! - its bare name is in the ignore directory set, or
//! - the `.gitignore` rules of the nearest enclosing repository ignore it.
//!
//! A subdirectory holding its own `.git` entry starts a new repository, so
//! its subtree is filtered by its own rules.
//!
//! ## Concurrency
//!
//! Each visited directory fans its surviving subdirectories out with rayon's
//! `par_iter`. When run inside the explorer's pool, every level shares that
//! one bounded pool instead of spawning workers of its own. Partial results
//! are merged, sorted and de-duplicated at every level, so the output does
//! not depend on task completion order.
//!
//! Directories that cannot be listed contribute an empty subtree. Once the
//! cancellation token is set, no further filesystem operation is started.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, trace};
use rayon::prelude::*;

use crate::cancel::CancellationToken;
use crate::config::SearchConfig;
use crate::filesystem::FileSystem;
use crate::gitignore::{is_repository, repository_root, GitignoreCache, GitignoreRegistry};
use crate::matcher::RootMatcher;
use crate::path::sort_and_dedup;

/// Depth-bounded, parallel search for roots below an anchor
pub struct DescendantSearch<'a> {
    fs: &'a dyn FileSystem,
    config: &'a SearchConfig,
    matcher: &'a RootMatcher<'a>,
    gitignores: &'a GitignoreRegistry,
    cancel: &'a CancellationToken,
}

impl<'a> DescendantSearch<'a> {
    pub fn new(
        fs: &'a dyn FileSystem,
        config: &'a SearchConfig,
        matcher: &'a RootMatcher<'a>,
        gitignores: &'a GitignoreRegistry,
        cancel: &'a CancellationToken,
    ) -> Self {
        Self {
            fs,
            config,
            matcher,
            gitignores,
            cancel,
        }
    }

    /// Collect the roots at most `depth - 1` levels below `anchor`, sorted.
    ///
    /// A depth of 0 visits nothing.
    pub fn explore(&self, anchor: &Path, depth: usize) -> Vec<PathBuf> {
        if depth == 0 {
            return Vec::new();
        }
        let repo = self
            .gitignores
            .for_repo(&repository_root(self.fs, anchor));
        self.visit(anchor, depth, &repo)
    }

    fn visit(&self, dir: &Path, depth: usize, repo: &Arc<GitignoreCache>) -> Vec<PathBuf> {
        if depth == 0 || self.cancel.is_cancelled() {
            return Vec::new();
        }
        trace!("Visiting {} (depth {})", dir.display(), depth);

        let mut roots = Vec::new();
        if self.matcher.is_root(dir) {
            roots.push(dir.to_path_buf());
        }

        // The next level would visit nothing.
        if depth == 1 {
            return roots;
        }

        let subdirs = self.subdirectories(dir, repo);
        if subdirs.is_empty() || self.cancel.is_cancelled() {
            return roots;
        }

        let nested: Vec<PathBuf> = subdirs
            .par_iter()
            .flat_map_iter(|subdir| {
                if is_repository(self.fs, subdir) {
                    let nested_repo = self.gitignores.for_repo(subdir);
                    self.visit(subdir, depth - 1, &nested_repo)
                } else {
                    self.visit(subdir, depth - 1, repo)
                }
            })
            .collect();

        roots.extend(nested);
        sort_and_dedup(&mut roots);
        roots
    }

    /// Immediate subdirectories of `dir` that survive the ignore set and
    /// the gitignore rules of `repo`
    fn subdirectories(&self, dir: &Path, repo: &GitignoreCache) -> Vec<PathBuf> {
        let entries = match self.fs.read_dir(dir) {
            Ok(entries) => entries,
            Err(err) => {
                debug!("Cannot list {}: {}", dir.display(), err);
                return Vec::new();
            }
        };

        entries
            .into_iter()
            .filter(|entry| entry.is_dir())
            .filter(|entry| {
                !entry
                    .name
                    .to_str()
                    .is_some_and(|name| self.config.is_ignored_dir(name))
            })
            .map(|entry| dir.join(&entry.name))
            .filter(|subdir| {
                let ignored = repo.is_ignored(subdir);
                if ignored {
                    trace!("Skipping gitignored {}", subdir.display());
                }
                !ignored
            })
            .collect()
    }
}
