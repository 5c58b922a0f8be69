//! The I/O capability bundle injected into the pipeline.
//!
//! The orchestrator performs every enumeration, read, write and directory
//! creation through [`Deps`]. [`OsDeps`] talks to the real filesystem;
//! [`MemoryDeps`] keeps everything in memory for tests and for comparing
//! fresh output against what is on disk.

use ignore::WalkBuilder;
use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Directory names never descended into when enumerating candidates.
pub const SKIPPED_DIRS: &[&str] = &["node_modules", ".generated", ".git", ".next"];

/// Filesystem primitives consumed by the pipeline.
pub trait Deps {
    /// Paths under `root` matching `pattern`, relative to `root`.
    fn glob(&self, root: &Path, pattern: &str) -> io::Result<Vec<PathBuf>>;

    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    fn write(&self, path: &Path, content: &str) -> io::Result<()>;

    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    fn exists(&self, path: &Path) -> bool;

    fn cwd(&self) -> PathBuf;
}

fn compile_pattern(pattern: &str) -> io::Result<glob::Pattern> {
    glob::Pattern::new(pattern).map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("invalid glob pattern '{}': {}", pattern, e),
        )
    })
}

fn match_options() -> glob::MatchOptions {
    glob::MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    }
}

fn in_skipped_dir(relative: &Path) -> bool {
    relative.components().any(|component| match component {
        Component::Normal(name) => name.to_str().is_some_and(|n| SKIPPED_DIRS.contains(&n)),
        _ => false,
    })
}

// =============================================================================
// OsDeps
// =============================================================================

/// [`Deps`] backed by the real filesystem.
#[derive(Debug, Clone)]
pub struct OsDeps {
    /// Whether to respect .gitignore files while enumerating.
    respect_gitignore: bool,
}

impl Default for OsDeps {
    fn default() -> Self {
        Self::new()
    }
}

impl OsDeps {
    pub fn new() -> Self {
        Self {
            respect_gitignore: true,
        }
    }

    /// Set whether to respect .gitignore files.
    pub fn with_gitignore(mut self, respect: bool) -> Self {
        self.respect_gitignore = respect;
        self
    }
}

impl Deps for OsDeps {
    fn glob(&self, root: &Path, pattern: &str) -> io::Result<Vec<PathBuf>> {
        if !root.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("directory not found: {}", root.display()),
            ));
        }

        let pattern = compile_pattern(pattern)?;
        let options = match_options();
        let mut matches = Vec::new();

        let walker = WalkBuilder::new(root)
            .git_ignore(self.respect_gitignore)
            .git_global(self.respect_gitignore)
            .git_exclude(self.respect_gitignore)
            .hidden(false)
            .filter_entry(|entry| {
                entry
                    .file_name()
                    .to_str()
                    .map_or(true, |name| !SKIPPED_DIRS.contains(&name))
            })
            .build();

        for entry in walker {
            let entry = entry.map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }

            let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
            if pattern.matches_path_with(relative, options) {
                matches.push(relative.to_path_buf());
            }
        }

        Ok(matches)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        std::fs::write(path, content)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn cwd(&self) -> PathBuf {
        std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
    }
}

// =============================================================================
// MemoryDeps
// =============================================================================

#[derive(Debug, Default)]
struct MemoryState {
    files: BTreeMap<PathBuf, String>,
    dirs: BTreeSet<PathBuf>,
    writes: Vec<PathBuf>,
}

/// In-memory [`Deps`] rooted at a fixed working directory.
#[derive(Debug)]
pub struct MemoryDeps {
    cwd: PathBuf,
    state: Mutex<MemoryState>,
}

impl MemoryDeps {
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: cwd.into(),
            state: Mutex::new(MemoryState::default()),
        }
    }

    /// Add a file at `path`; relative paths are resolved against the cwd.
    pub fn with_file(self, path: impl AsRef<Path>, content: impl Into<String>) -> Self {
        let path = self.resolve(path.as_ref());
        self.lock().files.insert(path, content.into());
        self
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.cwd.join(path)
        }
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Content of the file at `path`, if present.
    pub fn file(&self, path: impl AsRef<Path>) -> Option<String> {
        let path = self.resolve(path.as_ref());
        self.lock().files.get(&path).cloned()
    }

    /// Every path passed to [`Deps::write`], in call order.
    pub fn writes(&self) -> Vec<PathBuf> {
        self.lock().writes.clone()
    }

    /// Every directory passed to [`Deps::create_dir_all`].
    pub fn created_dirs(&self) -> Vec<PathBuf> {
        self.lock().dirs.iter().cloned().collect()
    }
}

impl Deps for MemoryDeps {
    fn glob(&self, root: &Path, pattern: &str) -> io::Result<Vec<PathBuf>> {
        let pattern = compile_pattern(pattern)?;
        let options = match_options();
        let root = self.resolve(root);

        Ok(self
            .lock()
            .files
            .keys()
            .filter_map(|path| path.strip_prefix(&root).ok())
            .filter(|relative| !in_skipped_dir(relative))
            .filter(|relative| pattern.matches_path_with(relative, options))
            .map(Path::to_path_buf)
            .collect())
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.file(path).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such file: {}", path.display()),
            )
        })
    }

    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        let path = self.resolve(path);
        let mut state = self.lock();
        state.writes.push(path.clone());
        state.files.insert(path, content.to_string());
        Ok(())
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        let path = self.resolve(path);
        self.lock().dirs.insert(path);
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        let path = self.resolve(path);
        let state = self.lock();
        state.files.contains_key(&path)
            || state.dirs.iter().any(|dir| dir.starts_with(&path))
            || state.files.keys().any(|file| file.starts_with(&path))
    }

    fn cwd(&self) -> PathBuf {
        self.cwd.clone()
    }
}
