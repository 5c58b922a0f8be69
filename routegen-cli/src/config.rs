//! Configuration management for the CLI.
//!
//! This module handles loading configuration from `routegen.toml` files
//! and merging with command-line arguments.

use crate::error::{CliResult, ConfigError};
use routegen::generator::{available_frameworks, is_known_framework};
use routegen::{GenerateOptions, OsDeps, CONFIG_FILE_PATTERN, DEFAULT_FRAMEWORK, DEFAULT_OUTPUT_DIR};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default configuration filename.
pub const CONFIG_FILENAME: &str = "routegen.toml";

/// Main configuration structure.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Project layout.
    pub project: ProjectConfig,

    /// Output configuration.
    pub output: OutputConfig,

    /// Descriptor discovery.
    pub scan: ScanConfig,
}

/// Project configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Directory scanned for descriptor files.
    pub root: PathBuf,

    /// Generator name or `auto`.
    pub framework: String,
}

/// Output configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Name of the subdirectory created next to each route's descriptors.
    pub dir: String,
}

/// Scan configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Glob pattern, relative to the project root.
    pub pattern: String,

    /// Whether to respect .gitignore files while enumerating.
    pub respect_gitignore: bool,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            framework: DEFAULT_FRAMEWORK.to_string(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: DEFAULT_OUTPUT_DIR.to_string(),
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            pattern: CONFIG_FILE_PATTERN.to_string(),
            respect_gitignore: true,
        }
    }
}

impl Config {
    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_known_framework(&self.project.framework) {
            return Err(ConfigError::invalid_value(
                "project.framework",
                format!(
                    "Unknown framework '{}'. Expected {} or one of: {}",
                    self.project.framework,
                    DEFAULT_FRAMEWORK,
                    available_frameworks().join(", ")
                ),
            ));
        }

        let dir = self.output.dir.trim();
        if dir.is_empty() || dir == "." || dir == ".." || dir.contains(['/', '\\']) {
            return Err(ConfigError::invalid_value(
                "output.dir",
                format!("'{}' must be a single directory name", self.output.dir),
            ));
        }

        if self.scan.pattern.trim().is_empty() {
            return Err(ConfigError::invalid_value("scan.pattern", "must not be empty"));
        }

        Ok(())
    }

    /// Options for one generation run.
    pub fn generate_options(&self) -> GenerateOptions {
        GenerateOptions::new(self.project.framework.clone())
            .with_root(self.project.root.clone())
            .with_output_dir(self.output.dir.clone())
            .with_pattern(self.scan.pattern.clone())
    }

    /// Filesystem access configured for descriptor discovery.
    pub fn os_deps(&self) -> OsDeps {
        OsDeps::new().with_gitignore(self.scan.respect_gitignore)
    }
}

/// Configuration manager for loading and merging configs.
pub struct ConfigManager;

impl ConfigManager {
    /// Load configuration from a file path.
    ///
    /// If the path is None, attempts to load from the default location.
    /// A missing file at the default location yields the defaults; a missing
    /// file that was named explicitly is an error.
    pub fn load(path: Option<&Path>) -> CliResult<Config> {
        let config_path = path
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILENAME));

        if path.is_none() && !config_path.exists() {
            tracing::debug!("no {} found, using defaults", CONFIG_FILENAME);
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&config_path).map_err(|e| ConfigError::Io {
            path: config_path.clone(),
            source: e,
        })?;

        let config = Self::parse(&content, &config_path)?;
        tracing::debug!(path = %config_path.display(), "loaded configuration");
        Ok(config)
    }

    /// Parse TOML content; `path` is only used for error messages.
    pub fn parse(content: &str, path: &Path) -> Result<Config, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::invalid_toml(path.to_path_buf(), e.to_string()))
    }

    /// Merge CLI arguments into configuration.
    ///
    /// CLI arguments take precedence over config file values.
    pub fn merge_cli_args(mut config: Config, args: &CliArgs) -> Config {
        if let Some(ref root) = args.root {
            config.project.root = root.clone();
        }

        if let Some(ref framework) = args.framework {
            config.project.framework = framework.clone();
        }

        if let Some(ref output_dir) = args.output_dir {
            config.output.dir = output_dir.clone();
        }

        config
    }

    /// Generate default configuration file content with comments.
    pub fn default_config_content() -> &'static str {
        r#"# routegen configuration file

[project]
# Directory scanned for route descriptor files (route.<method>.config.<ext>)
root = "."

# Target convention: "auto" detects per route directory from its closest
# `app` or `pages` path segment; "app-router" or "pages-router" forces one
framework = "auto"

[output]
# Subdirectory created next to each route's descriptor files
dir = ".generated"

[scan]
# Glob pattern for candidate descriptor files, relative to the project root
pattern = "**/route.*.config.*"

# Skip descriptors in files ignored by .gitignore
respect_gitignore = true
"#
    }
}

/// CLI arguments that can override configuration.
#[derive(Debug, Default)]
pub struct CliArgs {
    /// Scan root override.
    pub root: Option<PathBuf>,

    /// Framework override.
    pub framework: Option<String>,

    /// Output directory name override.
    pub output_dir: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.project.root, PathBuf::from("."));
        assert_eq!(config.project.framework, "auto");
        assert_eq!(config.output.dir, ".generated");
        assert_eq!(config.scan.pattern, "**/route.*.config.*");
        assert!(config.scan.respect_gitignore);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_content_parses_to_defaults() {
        let config = ConfigManager::parse(
            ConfigManager::default_config_content(),
            Path::new(CONFIG_FILENAME),
        )
        .unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_parse_partial_toml_keeps_defaults() {
        let toml = r#"
[project]
framework = "pages-router"
"#;
        let config = ConfigManager::parse(toml, Path::new("routegen.toml")).unwrap();
        assert_eq!(config.project.framework, "pages-router");
        assert_eq!(config.project.root, PathBuf::from("."));
        assert_eq!(config.output.dir, ".generated");
    }

    #[test]
    fn test_parse_full_toml() {
        let toml = r#"
[project]
root = "web"
framework = "app-router"

[output]
dir = "__generated__"

[scan]
pattern = "src/**/route.*.config.ts"
respect_gitignore = false
"#;
        let config = ConfigManager::parse(toml, Path::new("routegen.toml")).unwrap();
        assert_eq!(config.project.root, PathBuf::from("web"));
        assert_eq!(config.output.dir, "__generated__");
        assert_eq!(config.scan.pattern, "src/**/route.*.config.ts");
        assert!(!config.scan.respect_gitignore);

        let options = config.generate_options();
        assert_eq!(options.framework, "app-router");
        assert_eq!(options.root, Some(PathBuf::from("web")));
        assert_eq!(options.output_dir, "__generated__");
    }

    #[test]
    fn test_parse_invalid_toml_names_file() {
        let err = ConfigManager::parse("[project", Path::new("bad.toml")).unwrap_err();
        assert!(err.to_string().contains("bad.toml"));
    }

    #[test]
    fn test_merge_cli_args_override() {
        let args = CliArgs {
            root: Some(PathBuf::from("apps/web")),
            framework: Some("pages-router".to_string()),
            output_dir: Some("gen".to_string()),
        };

        let merged = ConfigManager::merge_cli_args(Config::default(), &args);
        assert_eq!(merged.project.root, PathBuf::from("apps/web"));
        assert_eq!(merged.project.framework, "pages-router");
        assert_eq!(merged.output.dir, "gen");
    }

    #[test]
    fn test_merge_cli_args_preserves_unset() {
        let config = Config::default();
        let merged = ConfigManager::merge_cli_args(config.clone(), &CliArgs::default());
        assert_eq!(merged, config);
    }

    #[test]
    fn test_validate_rejects_unknown_framework() {
        let mut config = Config::default();
        config.project.framework = "remix".to_string();
        let message = config.validate().unwrap_err().to_string();
        assert!(message.contains("project.framework"));
        assert!(message.contains("app-router, pages-router"));
    }

    #[test]
    fn test_validate_rejects_nested_output_dir() {
        let mut config = Config::default();
        config.output.dir = "out/gen".to_string();
        assert!(config.validate().is_err());
        config.output.dir = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_explicit_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("routegen.toml");
        assert!(ConfigManager::load(Some(&missing)).is_err());
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[output]\ndir = \"gen\"\n").unwrap();

        let config = ConfigManager::load(Some(&path)).unwrap();
        assert_eq!(config.output.dir, "gen");
    }
}
