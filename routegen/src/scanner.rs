//! Descriptor file discovery.
//!
//! The scanner never touches the filesystem itself: it asks an injected glob
//! function for candidate paths, keeps the ones named
//! `route.<method>.config.<ext>` and groups them by containing directory.

use crate::types::{ConfigFileRef, ConfigGroup, HttpMethod};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Glob pattern handed to the enumeration primitive.
pub const CONFIG_FILE_PATTERN: &str = "**/route.*.config.*";

/// Extract the method from a `route.<method>.config.<ext>` file name.
///
/// Returns `None` for any other shape and for unrecognized method tokens.
pub fn extract_method(file_name: &str) -> Option<HttpMethod> {
    let rest = file_name.strip_prefix("route.")?;
    let (token, rest) = rest.split_once('.')?;
    let ext = rest.strip_prefix("config.")?;
    if ext.is_empty() || ext.contains('.') {
        return None;
    }
    HttpMethod::parse(token)
}

/// List candidate files through `glob` and group the descriptors among them.
///
/// `glob` receives [`CONFIG_FILE_PATTERN`] and returns paths relative to
/// `root_dir`. Groups are sorted by directory, configs within a group by
/// method token. No matches yields an empty list.
pub fn scan_config_files<F, E>(glob: F, root_dir: &Path) -> Result<Vec<ConfigGroup>, E>
where
    F: FnOnce(&str) -> Result<Vec<PathBuf>, E>,
{
    scan_config_files_matching(glob, root_dir, CONFIG_FILE_PATTERN)
}

/// Like [`scan_config_files`] with a caller-supplied candidate pattern.
///
/// The pattern only narrows enumeration; every candidate must still be named
/// `route.<method>.config.<ext>` to be kept.
pub fn scan_config_files_matching<F, E>(
    glob: F,
    root_dir: &Path,
    pattern: &str,
) -> Result<Vec<ConfigGroup>, E>
where
    F: FnOnce(&str) -> Result<Vec<PathBuf>, E>,
{
    let candidates = glob(pattern)?;
    let mut groups: BTreeMap<PathBuf, Vec<ConfigFileRef>> = BTreeMap::new();

    for relative in candidates {
        let Some(file_name) = relative.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        let Some(method) = extract_method(file_name) else {
            continue;
        };

        let directory = relative
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        tracing::trace!(path = %relative.display(), %method, "matched descriptor file");

        groups.entry(directory.clone()).or_default().push(ConfigFileRef {
            directory,
            method,
            config_file_name: file_name.to_string(),
            absolute_path: root_dir.join(&relative),
        });
    }

    Ok(groups
        .into_iter()
        .map(|(directory, mut configs)| {
            configs.sort_by(|a, b| {
                a.method
                    .as_str()
                    .cmp(b.method.as_str())
                    .then_with(|| a.config_file_name.cmp(&b.config_file_name))
            });
            ConfigGroup { directory, configs }
        })
        .collect())
}
