//! Framework generators.
//!
//! Both conventions implement [`FrameworkGenerator`] and share their string
//! building through [`shared`]; the registry maps names to generators and
//! detects the convention of a route directory.

pub mod app_router;
pub mod pages_router;
pub mod registry;
pub mod shared;
pub mod traits;

pub use app_router::AppRouterGenerator;
pub use pages_router::PagesRouterGenerator;
pub use registry::{
    available_frameworks, detect_framework_generator, framework_generators,
    get_framework_generator, is_known_framework, DEFAULT_FRAMEWORK,
};
pub use traits::{FrameworkGenerator, GenerationContext};
