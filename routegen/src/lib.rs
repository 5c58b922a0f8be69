//! # routegen
//!
//! Generate typed route scaffolding for Next.js projects from per-method
//! route descriptor files.
//!
//! A descriptor is a TypeScript module named `route.<method>.config.<ext>`
//! that exports a `requestValidator` built from zod objects. For every
//! directory holding descriptors, routegen writes a `.generated/` folder
//! with a route entry, a fetch client, one React hook per method, and form
//! helpers when a method accepts a body.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use routegen::{generate, OsDeps};
//!
//! let result = generate(&OsDeps::new(), "auto");
//! if !result.success {
//!     eprintln!("{}", result.error.unwrap_or_default());
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`scanner`] - descriptor discovery and grouping by directory
//! - [`parser`] - structural extraction of validator facets and fields
//! - [`naming`] - identifier casing, labels and URL templates
//! - [`generator`] - the framework generator contract, registry and the
//!   `app-router` / `pages-router` implementations
//! - [`orchestrator`] - the end-to-end run
//! - [`deps`] - the injected filesystem capability bundle
//! - [`error`] - pipeline error types
//!
//! ## Conventions
//!
//! | Framework | Route entry | Server actions | Readme |
//! |-----------|-------------|----------------|--------|
//! | `app-router` | named `GET`/`POST`/... exports in `route.ts` | yes, with a body method | no |
//! | `pages-router` | default export in `handler.ts` | no | yes |
//!
//! With `auto`, the convention is detected per directory from its closest
//! `app` or `pages` path segment.

pub mod deps;
pub mod error;
pub mod generator;
pub mod naming;
pub mod orchestrator;
pub mod parser;
pub mod scanner;
pub mod types;

pub use deps::{Deps, MemoryDeps, OsDeps};
pub use error::{PipelineError, PipelineResult};
pub use generator::{
    available_frameworks, detect_framework_generator, get_framework_generator,
    FrameworkGenerator, GenerationContext, DEFAULT_FRAMEWORK,
};
pub use orchestrator::{generate, generate_with_options, GenerateOptions, DEFAULT_OUTPUT_DIR};
pub use parser::{extract_zod_object_fields, parse_config_file};
pub use scanner::{extract_method, scan_config_files, CONFIG_FILE_PATTERN};
pub use types::{
    ConfigFileRef, ConfigGroup, FieldDescriptor, GeneratedDirectory, GeneratedFile,
    GenerationResult, HttpMethod, RouteDescriptor, ZodType,
};
