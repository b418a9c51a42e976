//! Root predicate: marker files and ancestor-name patterns

use std::path::Path;

use log::trace;

use crate::config::{AncestorPattern, MarkerSequence};
use crate::filesystem::FileSystem;
use crate::path::{ends_with_str, join_components, parent_dir};

/// Why a directory qualified as a root
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootMatch {
    /// The marker sequence at this index exists below the directory
    Marker(usize),
    /// The directory's parent path ends with the pattern at this index
    AncestorName(usize),
}

/// Decides whether a directory is a root.
///
/// Marker sequences are tried first, then ancestor-name patterns. Stat
/// failures count as "no match", never as errors.
pub struct RootMatcher<'a> {
    fs: &'a dyn FileSystem,
    root_files: &'a [MarkerSequence],
    parent_dirs: &'a [AncestorPattern],
}

impl<'a> RootMatcher<'a> {
    pub fn new(
        fs: &'a dyn FileSystem,
        root_files: &'a [MarkerSequence],
        parent_dirs: &'a [AncestorPattern],
    ) -> Self {
        Self {
            fs,
            root_files,
            parent_dirs,
        }
    }

    pub fn is_root(&self, dir: &Path) -> bool {
        self.match_root(dir).is_some()
    }

    pub fn match_root(&self, dir: &Path) -> Option<RootMatch> {
        for (i, marker) in self.root_files.iter().enumerate() {
            let candidate = join_components(dir, marker.components());
            if self.fs.exists(&candidate) {
                trace!("{} is a root: found {}", dir.display(), marker);
                return Some(RootMatch::Marker(i));
            }
        }

        // The system root has no parent to compare against.
        let parent = parent_dir(dir)?;
        for (i, pattern) in self.parent_dirs.iter().enumerate() {
            if ends_with_str(parent, pattern.joined()) && self.fs.exists(parent) {
                trace!("{} is a root: parent matches {}", dir.display(), pattern);
                return Some(RootMatch::AncestorName(i));
            }
        }

        None
    }
}
