//! # routegen-cli
//!
//! Library half of the `routegen` command-line tool.
//!
//! The generation pipeline itself lives in the `routegen` crate; this crate
//! adds what a terminal workflow needs around it:
//!
//! - [`config`] - `routegen.toml` loading and command-line overrides
//! - [`writer`] - dry-run dependency bundle and on-disk comparison
//! - [`watcher`] - descriptor watching for development mode
//! - [`error`] - error types and exit codes

pub mod config;
pub mod error;
pub mod watcher;
pub mod writer;

pub use config::{Config, ConfigManager};
pub use error::{CliError, CliResult};
pub use watcher::FileWatcher;
pub use writer::DryRunDeps;
