//! Path manipulation utilities for roots
//!
//! The engine addresses everything relative to the system root. These
//! helpers convert base directories into that form and back, and implement
//! the string comparisons the pattern matcher relies on.

use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};

/// Resolve `base_dir` into a path relative to `system_root`.
///
/// `.` components are dropped. `..` components and paths outside the
/// system root are rejected, since the filesystem view cannot address them.
pub fn relative_to_root(system_root: &Path, base_dir: &Path) -> Result<PathBuf> {
    let stripped = base_dir
        .strip_prefix(system_root)
        .map_err(|_| Error::InvalidPath {
            path: base_dir.to_path_buf(),
            message: format!("not inside the system root {}", system_root.display()),
        })?;

    let mut relative = PathBuf::new();
    for component in stripped.components() {
        match component {
            Component::Normal(part) => relative.push(part),
            Component::CurDir => {}
            Component::RootDir | Component::Prefix(_) => {}
            Component::ParentDir => {
                return Err(Error::InvalidPath {
                    path: base_dir.to_path_buf(),
                    message: "parent components are not allowed".to_string(),
                })
            }
        }
    }
    Ok(relative)
}

/// Make `path` absolute against `cwd` and lexically resolve `.` and `..`
/// components, the way a shell would spell the directory.
pub fn absolutize(cwd: &Path, path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    };

    let mut cleaned = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // `..` at the root stays at the root.
                if matches!(cleaned.components().next_back(), Some(Component::Normal(_))) {
                    cleaned.pop();
                }
            }
            other => cleaned.push(other.as_os_str()),
        }
    }
    cleaned
}

/// The parent of a root-relative directory, `None` at the system root
pub fn parent_dir(dir: &Path) -> Option<&Path> {
    if dir.as_os_str().is_empty() {
        return None;
    }
    Some(dir.parent().unwrap_or(Path::new("")))
}

/// Join a sequence of components onto a directory
pub fn join_components<S: AsRef<str>>(dir: &Path, components: &[S]) -> PathBuf {
    let mut path = dir.to_path_buf();
    for component in components {
        path.push(component.as_ref());
    }
    path
}

/// Byte-wise suffix check on the string form of a path
pub fn ends_with_str(path: &Path, suffix: &Path) -> bool {
    path.as_os_str()
        .as_encoded_bytes()
        .ends_with(suffix.as_os_str().as_encoded_bytes())
}

/// Sort paths byte-wise and drop duplicates
pub fn sort_and_dedup(paths: &mut Vec<PathBuf>) {
    paths.sort_by(|a, b| a.as_os_str().cmp(b.as_os_str()));
    paths.dedup();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_to_root() {
        assert_eq!(
            relative_to_root(Path::new("/"), Path::new("/path/to/dir")).unwrap(),
            PathBuf::from("path/to/dir")
        );
        assert_eq!(
            relative_to_root(Path::new("/srv"), Path::new("/srv/./a/b/")).unwrap(),
            PathBuf::from("a/b")
        );
        assert_eq!(
            relative_to_root(Path::new("/"), Path::new("/")).unwrap(),
            PathBuf::new()
        );
    }

    #[test]
    fn test_relative_to_root_rejects_outside_paths() {
        let err = relative_to_root(Path::new("/srv"), Path::new("/home/me")).unwrap_err();
        assert!(matches!(err, Error::InvalidPath { .. }));

        let err = relative_to_root(Path::new("/"), Path::new("/a/../b")).unwrap_err();
        assert!(err.to_string().contains("parent components"));
    }

    #[test]
    fn test_absolutize() {
        let cwd = Path::new("/home/me/work");
        assert_eq!(absolutize(cwd, Path::new(".")), PathBuf::from("/home/me/work"));
        assert_eq!(
            absolutize(cwd, Path::new("../other/./repo")),
            PathBuf::from("/home/me/other/repo")
        );
        assert_eq!(absolutize(cwd, Path::new("/abs/dir/")), PathBuf::from("/abs/dir"));
        assert_eq!(absolutize(cwd, Path::new("/../..")), PathBuf::from("/"));
    }

    #[test]
    fn test_parent_dir() {
        assert_eq!(parent_dir(Path::new("a/b")), Some(Path::new("a")));
        assert_eq!(parent_dir(Path::new("a")), Some(Path::new("")));
        assert_eq!(parent_dir(Path::new("")), None);
    }

    #[test]
    fn test_join_components() {
        assert_eq!(
            join_components(Path::new("path/to/dir"), &[".git", "config"]),
            PathBuf::from("path/to/dir/.git/config")
        );
        assert_eq!(
            join_components(Path::new(""), &["go.mod"]),
            PathBuf::from("go.mod")
        );
    }

    #[test]
    fn test_ends_with_str_is_byte_wise() {
        assert!(ends_with_str(Path::new("path/to/dir/pkg"), Path::new("pkg")));
        assert!(ends_with_str(Path::new("path/to/mypkg"), Path::new("pkg")));
        assert!(ends_with_str(Path::new("a/b/c"), Path::new("b/c")));
        assert!(!ends_with_str(Path::new("path/to/dir"), Path::new("pkg")));
    }

    #[test]
    fn test_sort_and_dedup_is_byte_wise() {
        let mut paths = vec![
            PathBuf::from("a/b"),
            PathBuf::from("a-c"),
            PathBuf::from("a"),
            PathBuf::from("a/b"),
        ];
        sort_and_dedup(&mut paths);
        assert_eq!(
            paths,
            vec![PathBuf::from("a"), PathBuf::from("a-c"), PathBuf::from("a/b")]
        );
    }
}
