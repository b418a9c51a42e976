//! Property-based tests for the descendant search.
//!
//! These tests generate random directory trees in memory and check the
//! search against a direct computation of the expected roots.

#[cfg(test)]
mod proptest_tests {
    use std::path::{Path, PathBuf};
    use std::sync::Arc;

    use proptest::prelude::*;

    use crate::cancel::CancellationToken;
    use crate::config::SearchConfig;
    use crate::filesystem::{FileSystem, MemoryFS};
    use crate::gitignore::GitignoreRegistry;
    use crate::matcher::RootMatcher;
    use crate::path::{join_components, sort_and_dedup};
    use crate::search::DescendantSearch;

    const ANCHOR: &str = "work";

    type Tree = Vec<(Vec<&'static str>, bool)>;

    /// Directories below the anchor, each optionally holding a `go.mod`
    fn tree_strategy() -> impl Strategy<Value = Tree> {
        prop::collection::vec(
            (
                prop::collection::vec(prop::sample::select(vec!["a", "b", "c"]), 1..5),
                any::<bool>(),
            ),
            0..20,
        )
    }

    fn build_fs(tree: &Tree) -> Arc<dyn FileSystem> {
        let mut fs = MemoryFS::new();
        fs.add_dir(ANCHOR).unwrap();
        for (components, marked) in tree {
            let dir = join_components(Path::new(ANCHOR), components);
            if *marked {
                fs.touch(dir.join("go.mod")).unwrap();
            } else {
                fs.add_dir(&dir).unwrap();
            }
        }
        Arc::new(fs)
    }

    fn search(fs: &Arc<dyn FileSystem>, depth: usize) -> Vec<PathBuf> {
        let config = SearchConfig::default();
        let matcher = RootMatcher::new(fs.as_ref(), &config.root_files, &config.parent_dirs);
        let gitignores = GitignoreRegistry::new(Arc::clone(fs));
        let cancel = CancellationToken::new();
        DescendantSearch::new(fs.as_ref(), &config, &matcher, &gitignores, &cancel)
            .explore(Path::new(ANCHOR), depth)
    }

    fn expected(tree: &Tree, depth: usize) -> Vec<PathBuf> {
        let mut roots: Vec<PathBuf> = tree
            .iter()
            .filter(|(components, marked)| *marked && components.len() < depth)
            .map(|(components, _)| join_components(Path::new(ANCHOR), components))
            .collect();
        sort_and_dedup(&mut roots);
        roots
    }

    proptest! {
        /// Property: the search finds exactly the marked directories fewer
        /// than `depth` levels below the anchor, sorted and de-duplicated
        #[test]
        fn search_matches_depth_bounded_markers(tree in tree_strategy(), depth in 0usize..6) {
            let fs = build_fs(&tree);
            prop_assert_eq!(search(&fs, depth), expected(&tree, depth));
        }

        /// Property: repeated searches over the same tree agree
        #[test]
        fn search_is_deterministic(tree in tree_strategy(), depth in 1usize..6) {
            let fs = build_fs(&tree);
            prop_assert_eq!(search(&fs, depth), search(&fs, depth));
        }

        /// Property: a deeper search never loses a root
        #[test]
        fn search_is_monotonic_in_depth(tree in tree_strategy(), depth in 0usize..5) {
            let fs = build_fs(&tree);
            let shallow = search(&fs, depth);
            let deep = search(&fs, depth + 1);
            for root in &shallow {
                prop_assert!(deep.contains(root), "{} lost at depth {}", root.display(), depth + 1);
            }
        }
    }
}
