//! # Gitignore Cache
//!
//! Directories excluded by `.gitignore` rules are pruned from the descendant
//! search. The rules effective for a directory are the rules of every
//! `.gitignore` between the repository root and that directory, ordered from
//! the root downwards. Each file is compiled with the `ignore` crate's
//! [`GitignoreBuilder`] rooted at the directory holding it, so its rules only
//! ever match inside that directory's subtree.
//!
//! Both the pattern lists and the compiled matchers are memoized per
//! directory behind `RwLock`s. A miss is computed without holding a lock and
//! then published; concurrent racers may compute the same entry twice, which
//! is harmless because entries are immutable once written.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use ignore::Match;
use log::{debug, warn};

use crate::filesystem::FileSystem;
use crate::path::parent_dir;

/// Name of the per-directory ignore file
pub const GITIGNORE_FILE: &str = ".gitignore";

/// Entry marking a repository root
pub const GIT_DIR: &str = ".git";

/// Ordered rule sets effective for one directory, least specific first
pub type PatternList = Arc<[Arc<Gitignore>]>;

/// Compiled view over a [`PatternList`]
#[derive(Debug, Clone)]
pub struct IgnoreMatcher {
    layers: PatternList,
}

impl IgnoreMatcher {
    pub fn new(layers: PatternList) -> Self {
        Self { layers }
    }

    /// Decide whether `path` is ignored.
    ///
    /// Rule sets closer to `path` take precedence: the deepest set that has
    /// an opinion (ignore or whitelist) decides.
    pub fn is_ignored(&self, path: &Path, is_dir: bool) -> bool {
        for layer in self.layers.iter().rev() {
            match layer.matched(path, is_dir) {
                Match::Ignore(_) => return true,
                Match::Whitelist(_) => return false,
                Match::None => {}
            }
        }
        false
    }

    pub fn is_empty(&self) -> bool {
        self.layers.iter().all(|layer| layer.is_empty())
    }
}

/// Memoized gitignore rules for one repository
pub struct GitignoreCache {
    fs: Arc<dyn FileSystem>,
    repo_root: PathBuf,
    patterns: RwLock<HashMap<PathBuf, PatternList>>,
    matchers: RwLock<HashMap<PathBuf, Arc<IgnoreMatcher>>>,
}

impl GitignoreCache {
    pub fn new(fs: Arc<dyn FileSystem>, repo_root: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            repo_root: repo_root.into(),
            patterns: RwLock::new(HashMap::new()),
            matchers: RwLock::new(HashMap::new()),
        }
    }

    pub fn repo_root(&self) -> &Path {
        &self.repo_root
    }

    /// Compiled matcher for the rules effective in `dir`
    pub fn matcher_for(&self, dir: &Path) -> Arc<IgnoreMatcher> {
        if let Some(matcher) = self
            .matchers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(dir)
        {
            return Arc::clone(matcher);
        }

        let matcher = Arc::new(IgnoreMatcher::new(self.patterns_for(dir)));
        self.matchers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(dir.to_path_buf())
            .or_insert(matcher)
            .clone()
    }

    /// Rule sets effective in `dir`: its parent's list followed by the
    /// rules of `dir/.gitignore`. Directories outside the repository have
    /// no rules.
    pub fn patterns_for(&self, dir: &Path) -> PatternList {
        if let Some(patterns) = self
            .patterns
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(dir)
        {
            return Arc::clone(patterns);
        }

        if !dir.starts_with(&self.repo_root) {
            return Arc::from(Vec::new());
        }

        let mut combined: Vec<Arc<Gitignore>> = Vec::new();
        if dir != self.repo_root {
            if let Some(parent) = parent_dir(dir) {
                combined.extend(self.patterns_for(parent).iter().cloned());
            }
        }
        if let Some(own) = self.read_patterns(dir) {
            combined.push(Arc::new(own));
        }

        let combined: PatternList = Arc::from(combined);
        self.patterns
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(dir.to_path_buf())
            .or_insert(combined)
            .clone()
    }

    /// Whether `dir` is excluded by the rules of its parent directory.
    /// The repository root itself is never ignored.
    pub fn is_ignored(&self, dir: &Path) -> bool {
        if dir == self.repo_root || !dir.starts_with(&self.repo_root) {
            return false;
        }
        match parent_dir(dir) {
            Some(parent) => self.matcher_for(parent).is_ignored(dir, true),
            None => false,
        }
    }

    /// Whether any directory strictly below `ancestor`, down to and
    /// including `descendant`, is ignored.
    pub fn is_ignored_between(&self, ancestor: &Path, descendant: &Path) -> bool {
        let Ok(rest) = descendant.strip_prefix(ancestor) else {
            return false;
        };
        let mut current = ancestor.to_path_buf();
        for component in rest.components() {
            current.push(component);
            if self.is_ignored(&current) {
                return true;
            }
        }
        false
    }

    /// Compile `dir/.gitignore`, or `None` when absent, unreadable or empty
    fn read_patterns(&self, dir: &Path) -> Option<Gitignore> {
        let path = dir.join(GITIGNORE_FILE);
        let data = match self.fs.read(&path) {
            Ok(data) => data,
            Err(err) => {
                if err.kind() != std::io::ErrorKind::NotFound {
                    debug!("Skipping unreadable {}: {}", path.display(), err);
                }
                return None;
            }
        };

        let mut builder = GitignoreBuilder::new(dir);
        let mut count = 0usize;
        for line in String::from_utf8_lossy(&data).lines() {
            if line.starts_with('#') || line.trim().is_empty() {
                continue;
            }
            match builder.add_line(Some(path.clone()), line) {
                Ok(_) => count += 1,
                Err(err) => warn!("Ignoring invalid pattern in {}: {}", path.display(), err),
            }
        }
        if count == 0 {
            return None;
        }

        match builder.build() {
            Ok(gitignore) => Some(gitignore),
            Err(err) => {
                warn!("Failed to compile {}: {}", path.display(), err);
                None
            }
        }
    }
}

/// Hands out one shared [`GitignoreCache`] per repository root
pub struct GitignoreRegistry {
    fs: Arc<dyn FileSystem>,
    caches: RwLock<HashMap<PathBuf, Arc<GitignoreCache>>>,
}

impl GitignoreRegistry {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self {
            fs,
            caches: RwLock::new(HashMap::new()),
        }
    }

    pub fn for_repo(&self, repo_root: &Path) -> Arc<GitignoreCache> {
        if let Some(cache) = self
            .caches
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(repo_root)
        {
            return Arc::clone(cache);
        }

        let cache = Arc::new(GitignoreCache::new(Arc::clone(&self.fs), repo_root));
        self.caches
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(repo_root.to_path_buf())
            .or_insert(cache)
            .clone()
    }
}

/// Whether `dir` holds a `.git` entry of its own
pub fn is_repository(fs: &dyn FileSystem, dir: &Path) -> bool {
    fs.exists(&dir.join(GIT_DIR))
}

/// Nearest directory at or above `dir` holding a `.git` entry, falling back
/// to `dir` itself
pub fn repository_root(fs: &dyn FileSystem, dir: &Path) -> PathBuf {
    let mut current = Some(dir);
    while let Some(candidate) = current {
        if is_repository(fs, candidate) {
            return candidate.to_path_buf();
        }
        current = parent_dir(candidate);
    }
    dir.to_path_buf()
}
