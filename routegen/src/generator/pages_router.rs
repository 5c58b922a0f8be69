//! Generator for the single-directory (`pages/`) routing convention.
//!
//! The route entry is a single default export that receives the route's
//! dynamic segment names and dispatches by request method. Server actions
//! have no equivalent here, so only the client, hooks, form fields and a
//! readme are emitted alongside it.

use std::path::Path;

use crate::generator::shared::{
    self, config_alias, config_imports, GENERATED_MARKER, RUNTIME_MODULE,
};
use crate::generator::traits::{route_path_after_marker, FrameworkGenerator, GenerationContext};
use crate::types::{GeneratedFile, RouteDescriptor};

pub const HANDLER_FILE: &str = "handler.ts";
pub const README_FILE: &str = "README.md";

/// Generator for the `pages/` directory convention.
#[derive(Debug, Clone, Copy, Default)]
pub struct PagesRouterGenerator;

impl PagesRouterGenerator {
    pub const NAME: &'static str = "pages-router";
    pub const ROOT_MARKER: &'static str = "pages";

    fn render_handler(&self, context: &GenerationContext) -> GeneratedFile {
        let segments: Vec<String> = context
            .dynamic_segments()
            .iter()
            .map(|segment| format!("{:?}", segment))
            .collect();

        let mut out = String::new();
        out.push_str(GENERATED_MARKER);
        out.push('\n');
        out.push_str(&format!(
            "import {{ createPagesRoute }} from \"{}\";\n",
            RUNTIME_MODULE
        ));
        out.push_str(&config_imports(&context.configs, false));
        out.push('\n');
        out.push_str("export default createPagesRoute({\n");
        out.push_str(&format!("  segments: [{}],\n", segments.join(", ")));
        out.push_str("  methods: {\n");
        for config in &context.configs {
            out.push_str(&format!(
                "    {}: {},\n",
                config.method.as_upper(),
                config_alias(config.method)
            ));
        }
        out.push_str("  },\n});\n");

        GeneratedFile::new(HANDLER_FILE, out)
    }

    fn render_readme(&self, context: &GenerationContext, files: &[GeneratedFile]) -> GeneratedFile {
        let mut out = String::new();
        out.push_str(&format!(
            "<!-- {} -->\n",
            GENERATED_MARKER.trim_start_matches("// ")
        ));
        out.push_str(&format!("# {} route\n\n", context.resource_name()));
        out.push_str(&format!(
            "Generated from the route descriptors in `{}` for `{}`.\n\n",
            context.directory.display(),
            context.route_path
        ));

        out.push_str("## Methods\n\n");
        out.push_str("| Method | Body | Params | Search params | Headers | Auth |\n");
        out.push_str("| --- | --- | --- | --- | --- | --- |\n");
        for config in &context.configs {
            out.push_str(&method_row(config));
        }

        out.push_str("\n## Files\n\n");
        for file in files {
            out.push_str(&format!("- `{}`\n", file.file_name));
        }
        out.push_str(&format!("- `{}`\n", README_FILE));

        out.push_str(
            "\n## Wiring\n\n\
             Re-export the handler from the API route file that owns this directory:\n\n\
             ```ts\n\
             export { default } from \"./.generated/handler\";\n\
             ```\n\n\
             Server actions and form actions are not available in this convention; \
             submit forms through the client or the generated hooks instead.\n",
        );

        GeneratedFile::new(README_FILE, out)
    }
}

fn facet_cell(declared: bool, field_count: usize) -> String {
    match (declared, field_count) {
        (false, _) => "-".to_string(),
        (true, 0) => "yes".to_string(),
        (true, n) => format!("{} field{}", n, if n == 1 { "" } else { "s" }),
    }
}

fn method_row(config: &RouteDescriptor) -> String {
    format!(
        "| {} | {} | {} | {} | {} | {} |\n",
        config.method.as_upper(),
        facet_cell(config.has_body, config.body_fields.len()),
        facet_cell(config.has_params, config.param_fields.len()),
        facet_cell(config.has_search_params, config.search_param_fields.len()),
        facet_cell(config.has_headers, config.header_fields.len()),
        if config.has_auth { "required" } else { "-" },
    )
}

impl FrameworkGenerator for PagesRouterGenerator {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> &'static str {
        "Next.js Pages Router: single default API handler dispatching by method"
    }

    fn root_marker(&self) -> &'static str {
        Self::ROOT_MARKER
    }

    fn resolve_route_path(&self, directory: &Path) -> String {
        route_path_after_marker(directory, Self::ROOT_MARKER, |_| false)
    }

    fn generate(&self, context: &GenerationContext) -> Vec<GeneratedFile> {
        let mut files = vec![self.render_handler(context), shared::render_client(context)];
        files.extend(
            context
                .configs
                .iter()
                .map(|config| shared::render_hook(context, config)),
        );
        files.extend(shared::render_form_fields(context));

        let readme = self.render_readme(context, &files);
        files.push(readme);

        tracing::debug!(
            generator = Self::NAME,
            route = %context.route_path,
            files = files.len(),
            "rendered route artifacts"
        );

        files
    }
}
