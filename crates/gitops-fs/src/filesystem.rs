//! The filesystem seam used by the compiler
//!
//! There is no atomicity guarantee across multiple files. Callers that write
//! a whole tree rely on regenerating identical content when re-run.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::{Error, NormalizedPath, Result, io};

/// Byte-level filesystem access keyed by [`NormalizedPath`].
pub trait Filesystem: Send + Sync {
    /// True if a file or directory exists at `path`.
    fn exists(&self, path: &NormalizedPath) -> bool;

    /// True if `path` is a directory.
    fn is_dir(&self, path: &NormalizedPath) -> bool;

    /// Read the full content of a file.
    fn read(&self, path: &NormalizedPath) -> Result<Vec<u8>>;

    /// Replace the content of a file, creating missing parent directories.
    fn write(&self, path: &NormalizedPath, content: &[u8]) -> Result<()>;

    /// Create a directory and all of its missing parents.
    fn create_dir_all(&self, path: &NormalizedPath) -> Result<()>;
}

/// The real filesystem. Writes go through [`io::write_atomic`].
#[derive(Debug, Default, Clone, Copy)]
pub struct OsFilesystem;

impl OsFilesystem {
    pub fn new() -> Self {
        Self
    }
}

impl Filesystem for OsFilesystem {
    fn exists(&self, path: &NormalizedPath) -> bool {
        path.to_native().exists()
    }

    fn is_dir(&self, path: &NormalizedPath) -> bool {
        path.to_native().is_dir()
    }

    fn read(&self, path: &NormalizedPath) -> Result<Vec<u8>> {
        io::read_bytes(path)
    }

    fn write(&self, path: &NormalizedPath, content: &[u8]) -> Result<()> {
        io::write_atomic(path, content)
    }

    fn create_dir_all(&self, path: &NormalizedPath) -> Result<()> {
        let native = path.to_native();
        fs::create_dir_all(&native).map_err(|e| Error::io(native, e))
    }
}

/// An in-memory filesystem.
///
/// Directories are tracked explicitly so that empty directories (such as a
/// service's `base/config`) are observable.
#[derive(Debug, Default)]
pub struct MemoryFilesystem {
    files: Mutex<BTreeMap<NormalizedPath, Vec<u8>>>,
    dirs: Mutex<BTreeSet<NormalizedPath>>,
}

impl MemoryFilesystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// All files currently held, in path order.
    pub fn files(&self) -> BTreeMap<NormalizedPath, Vec<u8>> {
        lock(&self.files).clone()
    }

    /// All directories currently held, in path order.
    pub fn dirs(&self) -> BTreeSet<NormalizedPath> {
        lock(&self.dirs).clone()
    }

    fn add_dir_chain(&self, path: &NormalizedPath) {
        let mut dirs = lock(&self.dirs);
        dirs.insert(path.clone());
        dirs.extend(path.ancestors());
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Filesystem for MemoryFilesystem {
    fn exists(&self, path: &NormalizedPath) -> bool {
        lock(&self.files).contains_key(path) || lock(&self.dirs).contains(path)
    }

    fn is_dir(&self, path: &NormalizedPath) -> bool {
        lock(&self.dirs).contains(path)
    }

    fn read(&self, path: &NormalizedPath) -> Result<Vec<u8>> {
        lock(&self.files)
            .get(path)
            .cloned()
            .ok_or_else(|| Error::NotFound {
                path: path.to_native(),
            })
    }

    fn write(&self, path: &NormalizedPath, content: &[u8]) -> Result<()> {
        if let Some(parent) = path.parent() {
            self.add_dir_chain(&parent);
        }
        lock(&self.files).insert(path.clone(), content.to_vec());
        Ok(())
    }

    fn create_dir_all(&self, path: &NormalizedPath) -> Result<()> {
        self.add_dir_chain(path);
        Ok(())
    }
}

/// Reads fall through to `lower`; writes are captured in memory.
///
/// Used for dry runs: the whole add operation runs unchanged against the
/// real tree, and the captured writes become the preview.
pub struct OverlayFilesystem<'a> {
    lower: &'a dyn Filesystem,
    upper: MemoryFilesystem,
}

impl<'a> OverlayFilesystem<'a> {
    pub fn new(lower: &'a dyn Filesystem) -> Self {
        Self {
            lower,
            upper: MemoryFilesystem::new(),
        }
    }

    /// Files that would have been written to `lower`.
    pub fn captured(&self) -> BTreeMap<NormalizedPath, Vec<u8>> {
        self.upper.files()
    }

    /// Directories that would have been created in `lower`.
    pub fn captured_dirs(&self) -> BTreeSet<NormalizedPath> {
        self.upper.dirs()
    }
}

impl Filesystem for OverlayFilesystem<'_> {
    fn exists(&self, path: &NormalizedPath) -> bool {
        self.upper.exists(path) || self.lower.exists(path)
    }

    fn is_dir(&self, path: &NormalizedPath) -> bool {
        self.upper.is_dir(path) || self.lower.is_dir(path)
    }

    fn read(&self, path: &NormalizedPath) -> Result<Vec<u8>> {
        match self.upper.read(path) {
            Err(e) if e.is_not_found() => self.lower.read(path),
            other => other,
        }
    }

    fn write(&self, path: &NormalizedPath, content: &[u8]) -> Result<()> {
        debug!(path = %path, "capturing write in overlay");
        self.upper.write(path, content)
    }

    fn create_dir_all(&self, path: &NormalizedPath) -> Result<()> {
        self.upper.create_dir_all(path)
    }
}
