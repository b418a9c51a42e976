//! Read-only filesystem views used by the explorer
//!
//! Every path handed to a [`FileSystem`] is relative to the view's system
//! root. The empty path addresses the system root itself.

use std::collections::{BTreeMap, BTreeSet};
use std::ffi::OsString;
use std::io;
use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};

/// The kind of entry found at a path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    File,
    Dir,
}

impl FileKind {
    pub fn is_dir(self) -> bool {
        self == FileKind::Dir
    }
}

/// One entry of a directory listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// Bare entry name, without any directory components, as stored on disk
    pub name: OsString,
    pub kind: FileKind,
}

impl DirEntry {
    pub fn is_dir(&self) -> bool {
        self.kind.is_dir()
    }
}

/// Abstract read-only filesystem rooted at a system-root prefix
pub trait FileSystem: Send + Sync {
    /// Stat a path. Missing paths report `io::ErrorKind::NotFound`.
    fn metadata(&self, path: &Path) -> io::Result<FileKind>;

    /// List the immediate entries of a directory.
    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>>;

    /// Read the full contents of a file.
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Check whether anything exists at a path
    fn exists(&self, path: &Path) -> bool {
        self.metadata(path).is_ok()
    }
}

/// Disk-backed filesystem view, the equivalent of opening `root` as a
/// directory filesystem.
#[derive(Debug, Clone)]
pub struct OsFileSystem {
    root: PathBuf,
}

impl OsFileSystem {
    /// Create a view rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory this view is rooted at
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }
}

impl FileSystem for OsFileSystem {
    fn metadata(&self, path: &Path) -> io::Result<FileKind> {
        let metadata = std::fs::metadata(self.resolve(path))?;
        Ok(if metadata.is_dir() {
            FileKind::Dir
        } else {
            FileKind::File
        })
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(self.resolve(path))? {
            let entry = entry?;
            // Symlinks are reported by their own type and never followed.
            let file_type = entry.file_type()?;
            entries.push(DirEntry {
                name: entry.file_name(),
                kind: if file_type.is_dir() {
                    FileKind::Dir
                } else {
                    FileKind::File
                },
            });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(self.resolve(path))
    }
}

/// Represents a file with content
#[derive(Debug, Clone, Default)]
pub struct File {
    /// File content as bytes
    pub content: Vec<u8>,
}

impl File {
    /// Create a new file with content
    pub fn new(content: Vec<u8>) -> Self {
        Self { content }
    }

    /// Create a new file from string content
    pub fn from_string(content: &str) -> Self {
        Self::new(content.as_bytes().to_vec())
    }

    /// Get file size in bytes
    pub fn size(&self) -> usize {
        self.content.len()
    }
}

/// In-memory filesystem for fixtures and tests
///
/// Adding a file implicitly creates all of its parent directories. A path
/// stored as a file that also has entries below it is reported as a
/// directory.
#[derive(Debug, Clone, Default)]
pub struct MemoryFS {
    files: BTreeMap<PathBuf, File>,
    dirs: BTreeSet<PathBuf>,
}

impl MemoryFS {
    /// Create a new empty filesystem
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or update a file
    pub fn add_file<P: AsRef<Path>>(&mut self, path: P, file: File) -> Result<()> {
        let path = normalize(path.as_ref())?;
        if path.as_os_str().is_empty() {
            return Err(Error::InvalidPath {
                path,
                message: "the system root cannot be a file".to_string(),
            });
        }
        self.add_parents(&path);
        self.files.insert(path, file);
        Ok(())
    }

    /// Add a file with string content
    pub fn add_file_string<P: AsRef<Path>>(&mut self, path: P, content: &str) -> Result<()> {
        self.add_file(path, File::from_string(content))
    }

    /// Add an empty file
    pub fn touch<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.add_file(path, File::default())
    }

    /// Add a directory, creating its parents as needed
    pub fn add_dir<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = normalize(path.as_ref())?;
        self.add_parents(&path);
        if !path.as_os_str().is_empty() {
            self.dirs.insert(path);
        }
        Ok(())
    }

    /// Get a file by path
    pub fn get_file<P: AsRef<Path>>(&self, path: P) -> Option<&File> {
        let path = normalize(path.as_ref()).ok()?;
        self.files.get(&path)
    }

    /// Number of files
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if filesystem holds no files
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    fn add_parents(&mut self, path: &Path) {
        let mut parent = path.parent();
        while let Some(dir) = parent {
            if dir.as_os_str().is_empty() {
                break;
            }
            if !self.dirs.insert(dir.to_path_buf()) {
                break;
            }
            parent = dir.parent();
        }
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.as_os_str().is_empty() || self.dirs.contains(path)
    }
}

impl FileSystem for MemoryFS {
    fn metadata(&self, path: &Path) -> io::Result<FileKind> {
        let path = normalize(path).map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        if self.is_dir(&path) {
            Ok(FileKind::Dir)
        } else if self.files.contains_key(&path) {
            Ok(FileKind::File)
        } else {
            Err(not_found(&path))
        }
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        let path = normalize(path).map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        if !self.is_dir(&path) {
            return Err(if self.files.contains_key(&path) {
                io::Error::new(
                    io::ErrorKind::Other,
                    format!("{} is not a directory", path.display()),
                )
            } else {
                not_found(&path)
            });
        }

        let mut entries: BTreeMap<OsString, FileKind> = BTreeMap::new();
        let children = self
            .dirs
            .iter()
            .map(|p| (p, FileKind::Dir))
            .chain(self.files.keys().map(|p| (p, FileKind::File)));
        for (child, kind) in children {
            if child.parent() != Some(path.as_path()) {
                continue;
            }
            if let Some(name) = child.file_name() {
                // A directory entry wins over a file stored at the same path.
                entries
                    .entry(name.to_os_string())
                    .and_modify(|k| {
                        if kind.is_dir() {
                            *k = kind
                        }
                    })
                    .or_insert(kind);
            }
        }

        Ok(entries
            .into_iter()
            .map(|(name, kind)| DirEntry { name, kind })
            .collect())
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        let path = normalize(path).map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        self.files
            .get(&path)
            .map(|file| file.content.clone())
            .ok_or_else(|| not_found(&path))
    }
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("{}: no such file or directory", path.display()),
    )
}

/// Normalize a relative fixture path, dropping `.` and leading separators
fn normalize(path: &Path) -> Result<PathBuf> {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => normalized.push(part),
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
            Component::ParentDir => {
                return Err(Error::InvalidPath {
                    path: path.to_path_buf(),
                    message: "parent components are not allowed".to_string(),
                })
            }
        }
    }
    Ok(normalized)
}
