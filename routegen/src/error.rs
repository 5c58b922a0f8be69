//! Error types for the generation pipeline.
//!
//! Only three conditions stop a run: an unknown framework name, a scan that
//! finds no descriptor files, and an I/O failure reported by the injected
//! dependency bundle. Everything else degrades to a permissive default.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Fatal error for one end-to-end run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Framework name is neither registered nor `auto`.
    #[error("Unknown framework '{name}'. Available frameworks: {}", .available.join(", "))]
    UnknownFramework {
        name: String,
        available: Vec<&'static str>,
    },

    /// Scan produced zero descriptor groups.
    #[error(
        "No route config files found in {root}. Expected files named \
         route.<method>.config.<ext> where <method> is one of get, post, put, patch, delete"
    )]
    NoConfigFiles { root: PathBuf },

    /// The dependency bundle failed to enumerate, read or write.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PipelineError {
    /// Create an unknown framework error.
    pub fn unknown_framework(name: impl Into<String>, available: Vec<&'static str>) -> Self {
        Self::UnknownFramework {
            name: name.into(),
            available,
        }
    }

    /// Create a no config files error.
    pub fn no_config_files(root: impl Into<PathBuf>) -> Self {
        Self::NoConfigFiles { root: root.into() }
    }

    /// Attach a path to an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_framework_message_lists_available() {
        let err = PipelineError::unknown_framework("remix", vec!["app-router", "pages-router"]);
        let message = err.to_string();
        assert!(message.contains("Unknown framework 'remix'"));
        assert!(message.contains("app-router, pages-router"));
    }

    #[test]
    fn test_no_config_files_mentions_root() {
        let err = PipelineError::no_config_files("/project");
        assert!(err.to_string().contains("/project"));
    }
}
