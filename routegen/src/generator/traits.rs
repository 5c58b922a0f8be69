//! Framework generator trait definition.
//!
//! Every target convention implements [`FrameworkGenerator`]. The two
//! operations are deliberately small: map a route directory to its URL
//! path, and turn the descriptors of that directory into output files.

use std::path::{Component, Path, PathBuf};

use crate::naming;
use crate::types::{GeneratedFile, RouteDescriptor};

/// Everything a generator needs for one route directory.
#[derive(Debug, Clone)]
pub struct GenerationContext {
    /// Route directory, relative to the scan root.
    pub directory: PathBuf,
    /// URL path such as `/api/posts/[postId]`.
    pub route_path: String,
    /// One descriptor per declared method, ordered by method token.
    pub configs: Vec<RouteDescriptor>,
}

impl GenerationContext {
    pub fn new(
        directory: impl Into<PathBuf>,
        route_path: impl Into<String>,
        configs: Vec<RouteDescriptor>,
    ) -> Self {
        Self {
            directory: directory.into(),
            route_path: route_path.into(),
            configs,
        }
    }

    /// PascalCase name used for the client class, hooks and types.
    pub fn resource_name(&self) -> String {
        naming::resource_name(&self.route_path)
    }

    /// Dynamic segment names of the route path, left to right.
    pub fn dynamic_segments(&self) -> Vec<String> {
        naming::extract_dynamic_segments(&self.route_path)
    }

    /// Descriptors whose request declares a body.
    pub fn body_methods(&self) -> impl Iterator<Item = &RouteDescriptor> {
        self.configs.iter().filter(|config| config.has_body)
    }

    pub fn has_body_method(&self) -> bool {
        self.body_methods().next().is_some()
    }
}

/// Trait for framework-specific artifact generators.
///
/// Implementations share all string building through
/// [`shared`](crate::generator::shared) and differ only in file naming,
/// export shape and which files they emit.
pub trait FrameworkGenerator: Send + Sync {
    /// Registry name, e.g. `app-router`.
    fn name(&self) -> &'static str;

    /// Human-readable description for listings.
    fn description(&self) -> &'static str;

    /// Directory name that anchors route paths for this convention.
    fn root_marker(&self) -> &'static str;

    /// URL path for a route directory.
    fn resolve_route_path(&self, directory: &Path) -> String;

    /// Output files for one route directory.
    fn generate(&self, context: &GenerationContext) -> Vec<GeneratedFile>;
}

/// Normal path components of `directory` as strings.
pub(crate) fn path_segments(directory: &Path) -> Vec<String> {
    directory
        .components()
        .filter_map(|component| match component {
            Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect()
}

/// Join the segments after the last `marker` segment into a URL path.
///
/// Without a marker the whole directory is taken as the route path.
/// Segments for which `skip` returns true are left out.
pub(crate) fn route_path_after_marker(
    directory: &Path,
    marker: &str,
    skip: impl Fn(&str) -> bool,
) -> String {
    let segments = path_segments(directory);
    let start = segments
        .iter()
        .rposition(|segment| segment == marker)
        .map_or(0, |idx| idx + 1);

    let route: Vec<&str> = segments[start..]
        .iter()
        .map(String::as_str)
        .filter(|segment| !skip(*segment))
        .collect();

    format!("/{}", route.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HttpMethod;

    #[test]
    fn test_route_path_after_last_marker() {
        let path = route_path_after_marker(Path::new("src/app/api/app/items"), "app", |_| false);
        assert_eq!(path, "/items");
    }

    #[test]
    fn test_route_path_without_marker_uses_whole_directory() {
        let path = route_path_after_marker(Path::new("api/posts/[postId]"), "app", |_| false);
        assert_eq!(path, "/api/posts/[postId]");
    }

    #[test]
    fn test_route_path_marker_is_leaf() {
        assert_eq!(route_path_after_marker(Path::new("app"), "app", |_| false), "/");
    }

    #[test]
    fn test_context_helpers() {
        let mut post = RouteDescriptor::empty(HttpMethod::Post, "route.post.config.ts");
        post.has_body = true;
        let context = GenerationContext::new(
            "app/api/posts/[postId]",
            "/api/posts/[postId]",
            vec![
                RouteDescriptor::empty(HttpMethod::Get, "route.get.config.ts"),
                post,
            ],
        );

        assert_eq!(context.resource_name(), "Posts");
        assert_eq!(context.dynamic_segments(), vec!["postId"]);
        assert!(context.has_body_method());
        assert_eq!(context.body_methods().count(), 1);
    }
}
