//! Ancestor walk: climb from a base directory to find the search anchor

use std::path::{Path, PathBuf};

use log::debug;

use crate::cancel::CancellationToken;
use crate::error::{Error, Result};
use crate::filesystem::FileSystem;
use crate::gitignore::GitignoreRegistry;
use crate::matcher::RootMatcher;
use crate::path::parent_dir;

/// Climbs toward the system root applying the root predicate at each level.
///
/// The anchor returned is the root found after `budget` matches, or the
/// highest match below the system root when the budget is never used up.
/// The budget is checked after every level: with a budget of 0 the walk
/// stops at the base unless the base is itself a root, in which case the
/// budget goes negative and the climb runs to the top. The anchor is not
/// the nearest root: climbing past it lets the descendant search see
/// sibling packages.
pub struct AncestorWalker<'a> {
    fs: &'a dyn FileSystem,
    matcher: &'a RootMatcher<'a>,
    gitignores: &'a GitignoreRegistry,
    budget: usize,
}

impl<'a> AncestorWalker<'a> {
    pub fn new(
        fs: &'a dyn FileSystem,
        matcher: &'a RootMatcher<'a>,
        gitignores: &'a GitignoreRegistry,
        budget: usize,
    ) -> Self {
        Self {
            fs,
            matcher,
            gitignores,
            budget,
        }
    }

    /// Find the anchor for `base`, a directory relative to the system root.
    ///
    /// Fails when `base` cannot be stat-ed or is not a directory. Returns
    /// `Ok(None)` when no ancestor qualifies.
    pub fn find_anchor(&self, cancel: &CancellationToken, base: &Path) -> Result<Option<PathBuf>> {
        let kind = self.fs.metadata(base).map_err(|e| Error::io(base, e))?;
        if !kind.is_dir() {
            return Err(Error::NotADirectory {
                path: base.to_path_buf(),
            });
        }

        let mut anchor: Option<PathBuf> = None;
        let mut remaining = isize::try_from(self.budget).unwrap_or(isize::MAX);
        let mut current = base;
        while let Some(parent) = parent_dir(current) {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }

            if self.matcher.is_root(current) {
                if let Some(lower) = &anchor {
                    // A root living in a subtree its ancestor ignores (a
                    // worktree under `.wt/`, say) is not climbed out of.
                    if self
                        .gitignores
                        .for_repo(current)
                        .is_ignored_between(current, lower)
                    {
                        debug!(
                            "{} is ignored by {}, keeping it as anchor",
                            lower.display(),
                            current.display()
                        );
                        break;
                    }
                }
                debug!("Ancestor root candidate {}", current.display());
                anchor = Some(current.to_path_buf());
                remaining -= 1;
            }

            if remaining == 0 {
                break;
            }
            current = parent;
        }

        Ok(anchor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AncestorPattern, MarkerSequence};
    use crate::filesystem::MemoryFS;
    use std::sync::Arc;

    fn fixture() -> Arc<MemoryFS> {
        let mut fs = MemoryFS::new();
        fs.touch("path/to/dir/file0").unwrap();
        fs.touch("path/to/dir/.git/config").unwrap();
        fs.add_file_string("path/to/dir/.gitignore", ".wt/\n").unwrap();
        fs.touch("path/to/dir/.wt/test-1/.git").unwrap();
        fs.touch("path/to/dir/.wt/test-1/.git/config").unwrap();
        fs.touch("path/to/dir/pkg/foo/path/file1").unwrap();
        fs.touch("path/to/dir/pkg/foo/package.json").unwrap();
        fs.touch("path/to/dir/pkg/bar/path/file2").unwrap();
        Arc::new(fs)
    }

    fn walk(
        fs: Arc<MemoryFS>,
        root_files: &[&str],
        parent_dirs: &[&str],
        budget: usize,
        base: &str,
    ) -> Result<Option<PathBuf>> {
        let root_files: Vec<MarkerSequence> = root_files.iter().map(|s| s.parse().unwrap()).collect();
        let parent_dirs: Vec<AncestorPattern> =
            parent_dirs.iter().map(|s| s.parse().unwrap()).collect();
        let matcher = RootMatcher::new(fs.as_ref(), &root_files, &parent_dirs);
        let registry = GitignoreRegistry::new(fs.clone());
        let walker = AncestorWalker::new(fs.as_ref(), &matcher, &registry, budget);
        walker.find_anchor(&CancellationToken::new(), Path::new(base))
    }

    #[test]
    fn test_base_itself_is_anchor() {
        let anchor = walk(fixture(), &[".git/config"], &[], 2, "path/to/dir").unwrap();
        assert_eq!(anchor, Some(PathBuf::from("path/to/dir")));
    }

    #[test]
    fn test_climbs_to_nearest_root() {
        let anchor = walk(fixture(), &[".git/config"], &[], 1, "path/to/dir/pkg/foo/path").unwrap();
        assert_eq!(anchor, Some(PathBuf::from("path/to/dir")));
    }

    #[test]
    fn test_budget_selects_higher_root() {
        let fs = fixture();
        let anchor = walk(
            fs.clone(),
            &[".git/config", "package.json"],
            &[],
            1,
            "path/to/dir/pkg/foo",
        )
        .unwrap();
        assert_eq!(anchor, Some(PathBuf::from("path/to/dir/pkg/foo")));

        let anchor = walk(fs, &[".git/config", "package.json"], &[], 2, "path/to/dir/pkg/foo").unwrap();
        assert_eq!(anchor, Some(PathBuf::from("path/to/dir")));
    }

    #[test]
    fn test_unexhausted_budget_keeps_highest_match() {
        let anchor = walk(fixture(), &["package.json"], &[], 5, "path/to/dir/pkg/foo/path").unwrap();
        assert_eq!(anchor, Some(PathBuf::from("path/to/dir/pkg/foo")));
    }

    #[test]
    fn test_zero_budget_stops_at_plain_base() {
        let anchor = walk(fixture(), &[".git/config"], &[], 0, "path/to/dir/pkg/foo/path").unwrap();
        assert_eq!(anchor, None);
    }

    #[test]
    fn test_zero_budget_from_root_climbs_to_the_top() {
        let anchor = walk(
            fixture(),
            &[".git/config", "package.json"],
            &[],
            0,
            "path/to/dir/pkg/foo",
        )
        .unwrap();
        assert_eq!(anchor, Some(PathBuf::from("path/to/dir")));
    }

    #[test]
    fn test_ancestor_name_pattern_counts_against_budget() {
        let anchor = walk(fixture(), &[".git/config"], &["pkg"], 2, "path/to/dir/pkg/foo").unwrap();
        assert_eq!(anchor, Some(PathBuf::from("path/to/dir")));

        let anchor = walk(fixture(), &[".git/config"], &["pkg"], 1, "path/to/dir/pkg/foo").unwrap();
        assert_eq!(anchor, Some(PathBuf::from("path/to/dir/pkg/foo")));
    }

    #[test]
    fn test_does_not_climb_out_of_ignored_worktree() {
        let anchor = walk(fixture(), &[".git"], &[], 2, "path/to/dir/.wt/test-1").unwrap();
        assert_eq!(anchor, Some(PathBuf::from("path/to/dir/.wt/test-1")));
    }

    #[test]
    fn test_no_anchor() {
        let anchor = walk(fixture(), &["go.mod"], &[], 2, "path/to/dir").unwrap();
        assert_eq!(anchor, None);
    }

    #[test]
    fn test_missing_base_is_fatal() {
        let err = walk(fixture(), &[".git/config"], &[], 2, "path/to/nowhere").unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn test_file_base_is_fatal() {
        let err = walk(fixture(), &[".git/config"], &[], 2, "path/to/dir/file0").unwrap_err();
        assert!(matches!(err, Error::NotADirectory { .. }));
    }

    #[test]
    fn test_cancelled_walk() {
        let fs = fixture();
        let root_files: Vec<MarkerSequence> = vec![".git/config".parse().unwrap()];
        let matcher = RootMatcher::new(fs.as_ref(), &root_files, &[]);
        let registry = GitignoreRegistry::new(fs.clone());
        let walker = AncestorWalker::new(fs.as_ref(), &matcher, &registry, 2);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = walker.find_anchor(&cancel, Path::new("path/to/dir")).unwrap_err();
        assert!(matches!(err, Error::Cancelled));
    }
}
