//! Registry of framework generators.
//!
//! Generators are stateless, so the registry is a static list looked up by
//! exact name. The `auto` sentinel is not a generator: it tells the
//! orchestrator to call [`detect_framework_generator`] once per directory.

use std::path::Path;

use crate::generator::app_router::AppRouterGenerator;
use crate::generator::pages_router::PagesRouterGenerator;
use crate::generator::traits::{path_segments, FrameworkGenerator};

/// Framework name meaning "detect the convention per route directory".
pub const DEFAULT_FRAMEWORK: &str = "auto";

static APP_ROUTER: AppRouterGenerator = AppRouterGenerator;
static PAGES_ROUTER: PagesRouterGenerator = PagesRouterGenerator;

static GENERATORS: [&(dyn FrameworkGenerator + 'static); 2] = [&APP_ROUTER, &PAGES_ROUTER];

/// Look up a generator by its exact registered name.
pub fn get_framework_generator(name: &str) -> Option<&'static dyn FrameworkGenerator> {
    GENERATORS
        .iter()
        .copied()
        .find(|generator| generator.name() == name)
}

/// Names of all registered generators, in registration order.
pub fn available_frameworks() -> Vec<&'static str> {
    GENERATORS.iter().map(|generator| generator.name()).collect()
}

/// All registered generators, in registration order.
pub fn framework_generators() -> &'static [&'static dyn FrameworkGenerator] {
    &GENERATORS
}

/// Pick the generator whose root marker appears in `directory`.
///
/// When both markers are present the one closest to the leaf wins. A
/// directory with neither falls back to the app-router generator.
pub fn detect_framework_generator(directory: &Path) -> &'static dyn FrameworkGenerator {
    let segments = path_segments(directory);
    let detected = segments.iter().rev().find_map(|segment| {
        GENERATORS
            .iter()
            .copied()
            .find(|generator| generator.root_marker() == segment.as_str())
    });

    match detected {
        Some(generator) => generator,
        None => {
            tracing::debug!(
                directory = %directory.display(),
                fallback = AppRouterGenerator::NAME,
                "no convention marker in directory"
            );
            &APP_ROUTER
        }
    }
}

/// Whether `name` is a registered generator or the `auto` sentinel.
pub fn is_known_framework(name: &str) -> bool {
    name == DEFAULT_FRAMEWORK || get_framework_generator(name).is_some()
}
