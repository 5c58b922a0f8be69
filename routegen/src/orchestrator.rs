//! End-to-end generation run.
//!
//! A run has two phases. The plan phase scans, reads, parses and renders
//! every route directory in memory; the write phase creates each output
//! directory and writes its files. Any failure before the write phase leaves
//! the filesystem untouched.

use std::path::{Path, PathBuf};

use crate::deps::Deps;
use crate::error::{PipelineError, PipelineResult};
use crate::generator::{
    available_frameworks, detect_framework_generator, get_framework_generator, FrameworkGenerator,
    GenerationContext, DEFAULT_FRAMEWORK,
};
use crate::parser::parse_config_file;
use crate::scanner::{scan_config_files_matching, CONFIG_FILE_PATTERN};
use crate::types::{ConfigGroup, GeneratedDirectory, GeneratedFile, GenerationResult};

/// Name of the per-route output subdirectory.
pub const DEFAULT_OUTPUT_DIR: &str = ".generated";

/// Knobs for one generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Registered generator name or `auto`.
    pub framework: String,
    /// Scan root; relative roots resolve against the dependency bundle's cwd.
    pub root: Option<PathBuf>,
    /// Output subdirectory created inside every route directory.
    pub output_dir: String,
    /// Candidate pattern handed to the enumeration primitive.
    pub pattern: String,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            framework: DEFAULT_FRAMEWORK.to_string(),
            root: None,
            output_dir: DEFAULT_OUTPUT_DIR.to_string(),
            pattern: CONFIG_FILE_PATTERN.to_string(),
        }
    }
}

impl GenerateOptions {
    pub fn new(framework: impl Into<String>) -> Self {
        Self {
            framework: framework.into(),
            ..Self::default()
        }
    }

    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<String>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = pattern.into();
        self
    }

    fn resolve_root(&self, deps: &dyn Deps) -> PathBuf {
        match &self.root {
            Some(root) if root.is_absolute() => root.clone(),
            Some(root) => deps.cwd().join(root),
            None => deps.cwd(),
        }
    }
}

/// Rendered output for one route directory, not yet written.
#[derive(Debug, Clone)]
struct PlannedDirectory {
    directory: PathBuf,
    output_path: PathBuf,
    files: Vec<GeneratedFile>,
}

/// Generate artifacts for every descriptor group under the current directory.
///
/// `framework` is a registered generator name or `auto`. Failures are
/// reported through [`GenerationResult::error`], never by panicking.
pub fn generate(deps: &dyn Deps, framework: &str) -> GenerationResult {
    generate_with_options(deps, &GenerateOptions::new(framework))
}

/// [`generate`] with an explicit root, output directory and pattern.
pub fn generate_with_options(deps: &dyn Deps, options: &GenerateOptions) -> GenerationResult {
    match try_generate(deps, options) {
        Ok(generated) => GenerationResult::success(generated),
        Err(err) => {
            tracing::warn!(error = %err, "generation failed");
            GenerationResult::failure(err.to_string())
        }
    }
}

fn try_generate(deps: &dyn Deps, options: &GenerateOptions) -> PipelineResult<Vec<GeneratedDirectory>> {
    let fixed = select_framework(&options.framework)?;
    let root = options.resolve_root(deps);

    let groups = scan_config_files_matching(
        |pattern| deps.glob(&root, pattern),
        &root,
        &options.pattern,
    )
    .map_err(|e| PipelineError::io(&root, e))?;

    if groups.is_empty() {
        return Err(PipelineError::no_config_files(root));
    }

    let plan = groups
        .iter()
        .map(|group| plan_group(deps, &root, group, fixed, &options.output_dir))
        .collect::<PipelineResult<Vec<_>>>()?;

    plan.iter().map(|planned| write_planned(deps, planned)).collect()
}

/// `None` means detect per directory.
fn select_framework(name: &str) -> PipelineResult<Option<&'static dyn FrameworkGenerator>> {
    if name == DEFAULT_FRAMEWORK {
        return Ok(None);
    }
    get_framework_generator(name)
        .map(Some)
        .ok_or_else(|| PipelineError::unknown_framework(name, available_frameworks()))
}

fn plan_group(
    deps: &dyn Deps,
    root: &Path,
    group: &ConfigGroup,
    fixed: Option<&'static dyn FrameworkGenerator>,
    output_dir: &str,
) -> PipelineResult<PlannedDirectory> {
    let configs = group
        .configs
        .iter()
        .map(|config| {
            let source = deps
                .read_to_string(&config.absolute_path)
                .map_err(|e| PipelineError::io(&config.absolute_path, e))?;
            Ok(parse_config_file(
                &source,
                config.method,
                &config.config_file_name,
            ))
        })
        .collect::<PipelineResult<Vec<_>>>()?;

    let generator = fixed.unwrap_or_else(|| detect_framework_generator(&group.directory));
    let route_path = generator.resolve_route_path(&group.directory);

    tracing::debug!(
        directory = %group.directory.display(),
        generator = generator.name(),
        route = %route_path,
        methods = configs.len(),
        "planning route directory"
    );

    let context = GenerationContext::new(&group.directory, route_path, configs);
    let files = generator.generate(&context);

    Ok(PlannedDirectory {
        directory: group.directory.clone(),
        output_path: root.join(&group.directory).join(output_dir),
        files,
    })
}

fn write_planned(deps: &dyn Deps, planned: &PlannedDirectory) -> PipelineResult<GeneratedDirectory> {
    if !deps.exists(&planned.output_path) {
        deps.create_dir_all(&planned.output_path)
            .map_err(|e| PipelineError::io(&planned.output_path, e))?;
    }

    for file in &planned.files {
        let path = planned.output_path.join(&file.file_name);
        deps.write(&path, &file.content)
            .map_err(|e| PipelineError::io(&path, e))?;
    }

    tracing::info!(
        directory = %planned.output_path.display(),
        files = planned.files.len(),
        "wrote route artifacts"
    );

    Ok(GeneratedDirectory {
        directory: planned.directory.clone(),
        files: planned
            .files
            .iter()
            .map(|file| file.file_name.clone())
            .collect(),
    })
}
