//! Dry-run support for generation runs.
//!
//! [`DryRunDeps`] wraps another dependency bundle: enumeration and reads go
//! through to it, while writes and directory creation are captured so they
//! can be previewed or compared against what is on disk.

use routegen::Deps;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// One captured write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedWrite {
    /// Path the content would have been written to.
    pub path: PathBuf,
    /// Content that would have been written.
    pub content: String,
}

/// How a captured write compares with the file currently on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStatus {
    /// No file exists at the path yet.
    Created,
    /// A file exists with different content.
    Changed,
    /// A file exists with identical content.
    Unchanged,
}

impl WriteStatus {
    /// Label used in CLI output.
    pub fn label(&self) -> &'static str {
        match self {
            WriteStatus::Created => "new",
            WriteStatus::Changed => "changed",
            WriteStatus::Unchanged => "unchanged",
        }
    }
}

#[derive(Debug, Default)]
struct Captured {
    writes: Vec<CapturedWrite>,
    dirs: Vec<PathBuf>,
}

/// Dependency bundle that never writes.
#[derive(Debug)]
pub struct DryRunDeps<D> {
    inner: D,
    captured: Mutex<Captured>,
}

impl<D: Deps> DryRunDeps<D> {
    /// Wrap `inner`, capturing every write made through the wrapper.
    pub fn new(inner: D) -> Self {
        Self {
            inner,
            captured: Mutex::new(Captured::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Captured> {
        self.captured.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Writes captured so far, in call order.
    pub fn writes(&self) -> Vec<CapturedWrite> {
        self.lock().writes.clone()
    }

    /// Directories that would have been created.
    pub fn created_dirs(&self) -> Vec<PathBuf> {
        self.lock().dirs.clone()
    }

    /// Compare a captured write with the current file at its path.
    pub fn status(&self, write: &CapturedWrite) -> WriteStatus {
        if !self.inner.exists(&write.path) {
            return WriteStatus::Created;
        }
        match self.inner.read_to_string(&write.path) {
            Ok(existing) if existing == write.content => WriteStatus::Unchanged,
            _ => WriteStatus::Changed,
        }
    }

    /// Every captured write paired with its status.
    pub fn statuses(&self) -> Vec<(CapturedWrite, WriteStatus)> {
        self.writes()
            .into_iter()
            .map(|write| {
                let status = self.status(&write);
                (write, status)
            })
            .collect()
    }
}

impl<D: Deps> Deps for DryRunDeps<D> {
    fn glob(&self, root: &Path, pattern: &str) -> io::Result<Vec<PathBuf>> {
        self.inner.glob(root, pattern)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        if let Some(write) = self.lock().writes.iter().rev().find(|w| w.path == path) {
            return Ok(write.content.clone());
        }
        self.inner.read_to_string(path)
    }

    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        self.lock().writes.push(CapturedWrite {
            path: path.to_path_buf(),
            content: content.to_string(),
        });
        Ok(())
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        self.lock().dirs.push(path.to_path_buf());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        {
            let captured = self.lock();
            if captured.dirs.iter().any(|dir| dir.starts_with(path))
                || captured.writes.iter().any(|w| w.path.starts_with(path))
            {
                return true;
            }
        }
        self.inner.exists(path)
    }

    fn cwd(&self) -> PathBuf {
        self.inner.cwd()
    }
}
