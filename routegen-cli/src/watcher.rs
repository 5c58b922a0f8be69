//! File watcher for development mode.
//!
//! Regeneration is triggered only by changes to route descriptor files.
//! Anything inside a generated output directory is ignored so that a run
//! never retriggers itself.

use crate::error::{CliResult, WatchError};
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use notify_debouncer_mini::{new_debouncer, DebouncedEvent, Debouncer};
use routegen::deps::SKIPPED_DIRS;
use routegen::extract_method;
use std::path::{Component, Path, PathBuf};
use std::sync::mpsc::{channel, Receiver};
use std::time::Duration;

/// Event types for descriptor changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// A descriptor was created or modified.
    Changed(PathBuf),
    /// A descriptor was deleted.
    Removed(PathBuf),
    /// An error occurred.
    Error(String),
}

impl WatchEvent {
    /// Get the path associated with this event.
    pub fn path(&self) -> Option<&Path> {
        match self {
            WatchEvent::Changed(p) | WatchEvent::Removed(p) => Some(p),
            WatchEvent::Error(_) => None,
        }
    }

    /// Get the error message if this is an error event.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            WatchEvent::Error(msg) => Some(msg),
            _ => None,
        }
    }
}

/// Whether a change to `path` should trigger regeneration.
///
/// `output_dir` is the configured per-route output directory name; it is
/// skipped along with the directories the scanner never enters.
pub fn is_descriptor_change(path: &Path, output_dir: &str) -> bool {
    let in_ignored_dir = path.components().any(|component| match component {
        Component::Normal(name) => name
            .to_str()
            .is_some_and(|n| n == output_dir || SKIPPED_DIRS.contains(&n)),
        _ => false,
    });
    if in_ignored_dir {
        return false;
    }

    path.file_name()
        .and_then(|name| name.to_str())
        .and_then(extract_method)
        .is_some()
}

/// File watcher for monitoring route descriptor files.
pub struct FileWatcher {
    /// Root directory to watch.
    root: PathBuf,
    /// Per-route output directory name to ignore.
    output_dir: String,
    /// Debounce duration in milliseconds.
    debounce_ms: u64,
}

impl FileWatcher {
    /// Create a new file watcher for the given directory.
    pub fn new(root: impl Into<PathBuf>, output_dir: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            output_dir: output_dir.into(),
            debounce_ms: 300,
        }
    }

    /// Set the debounce duration in milliseconds.
    pub fn with_debounce(mut self, ms: u64) -> Self {
        self.debounce_ms = ms;
        self
    }

    /// Start watching for descriptor changes.
    ///
    /// The returned debouncer must be kept alive for as long as events are
    /// wanted; dropping it stops the watch.
    pub fn watch(&self) -> CliResult<(Debouncer<RecommendedWatcher>, Receiver<WatchEvent>)> {
        let (tx, rx) = channel::<WatchEvent>();
        let output_dir = self.output_dir.clone();

        let mut debouncer = new_debouncer(
            Duration::from_millis(self.debounce_ms),
            move |result: Result<Vec<DebouncedEvent>, notify::Error>| match result {
                Ok(events) => {
                    for event in events {
                        let path = event.path;
                        if !is_descriptor_change(&path, &output_dir) {
                            continue;
                        }

                        let watch_event = if path.exists() {
                            WatchEvent::Changed(path)
                        } else {
                            WatchEvent::Removed(path)
                        };

                        if tx.send(watch_event).is_err() {
                            return;
                        }
                    }
                }
                Err(e) => {
                    let _ = tx.send(WatchEvent::Error(e.to_string()));
                }
            },
        )
        .map_err(|e| WatchError::Init(e.to_string()))?;

        debouncer
            .watcher()
            .watch(&self.root, RecursiveMode::Recursive)
            .map_err(|e| WatchError::Notify(e.to_string()))?;

        tracing::debug!(root = %self.root.display(), debounce_ms = self.debounce_ms, "watching");

        Ok((debouncer, rx))
    }
}

/// `first` plus every event already queued behind it.
///
/// The debouncer delivers a batch as consecutive sends, so the whole batch
/// is in the channel by the time its first event is received.
pub fn drain_batch(first: WatchEvent, rx: &Receiver<WatchEvent>) -> Vec<WatchEvent> {
    std::iter::once(first).chain(rx.try_iter()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_changes_trigger() {
        assert!(is_descriptor_change(
            Path::new("/p/app/api/posts/route.post.config.ts"),
            ".generated"
        ));
        assert!(is_descriptor_change(Path::new("route.get.config.js"), ".generated"));
    }

    #[test]
    fn test_other_files_are_ignored() {
        assert!(!is_descriptor_change(Path::new("/p/app/api/posts/route.ts"), ".generated"));
        assert!(!is_descriptor_change(Path::new("/p/app/page.tsx"), ".generated"));
        assert!(!is_descriptor_change(
            Path::new("/p/app/route.options.config.ts"),
            ".generated"
        ));
    }

    #[test]
    fn test_output_and_skipped_dirs_are_ignored() {
        assert!(!is_descriptor_change(
            Path::new("/p/app/api/.generated/route.get.config.ts"),
            ".generated"
        ));
        assert!(!is_descriptor_change(
            Path::new("/p/app/api/gen/route.get.config.ts"),
            "gen"
        ));
        assert!(!is_descriptor_change(
            Path::new("/p/node_modules/x/route.get.config.ts"),
            ".generated"
        ));
    }

    #[test]
    fn test_watch_event_accessors() {
        let path = PathBuf::from("/p/route.get.config.ts");
        assert_eq!(WatchEvent::Changed(path.clone()).path(), Some(path.as_path()));
        assert_eq!(WatchEvent::Removed(path.clone()).path(), Some(path.as_path()));

        let error = WatchEvent::Error("boom".to_string());
        assert_eq!(error.path(), None);
        assert_eq!(error.error_message(), Some("boom"));
    }

    #[test]
    fn test_drain_batch_collects_queued_events() {
        let (tx, rx) = channel();
        tx.send(WatchEvent::Changed(PathBuf::from("b/route.put.config.ts")))
            .unwrap();
        tx.send(WatchEvent::Removed(PathBuf::from("c/route.get.config.ts")))
            .unwrap();

        let batch = drain_batch(
            WatchEvent::Changed(PathBuf::from("a/route.post.config.ts")),
            &rx,
        );

        assert_eq!(batch.len(), 3);
        assert_eq!(batch[0].path(), Some(Path::new("a/route.post.config.ts")));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_file_watcher_settings() {
        let watcher = FileWatcher::new("/test/path", ".generated").with_debounce(1000);
        assert_eq!(watcher.root, PathBuf::from("/test/path"));
        assert_eq!(watcher.debounce_ms, 1000);
        assert_eq!(watcher.output_dir, ".generated");
    }
}
