//! Generator for the nested-folder (`app/`) routing convention.
//!
//! Each HTTP method becomes a named export of the route entry. Routes that
//! accept a body also get server-callable wrappers, form-submission
//! wrappers, hooks around both, and a form-fields file.

use std::path::Path;

use crate::generator::shared::{
    self, action_name, config_alias, config_imports, form_action_name, hook_name,
    input_type_name, param_fields, response_type_name, InputShape, GENERATED_MARKER,
    RUNTIME_MODULE, SERVER_DIRECTIVE,
};
use crate::generator::traits::{route_path_after_marker, FrameworkGenerator, GenerationContext};
use crate::types::{FieldDescriptor, GeneratedFile, RouteDescriptor, ZodType};

pub const ROUTE_FILE: &str = "route.ts";
pub const ACTIONS_FILE: &str = "actions.ts";
pub const FORM_ACTIONS_FILE: &str = "form-actions.ts";
pub const ACTION_HOOKS_FILE: &str = "use-actions.ts";
pub const FORM_ACTION_HOOKS_FILE: &str = "use-form-actions.ts";

/// `(group)` and `@slot` folders never appear in the URL.
fn is_route_group_or_slot(segment: &str) -> bool {
    (segment.starts_with('(') && segment.ends_with(')')) || segment.starts_with('@')
}

/// Generator for the `app/` directory convention.
#[derive(Debug, Clone, Copy, Default)]
pub struct AppRouterGenerator;

impl AppRouterGenerator {
    pub const NAME: &'static str = "app-router";
    pub const ROOT_MARKER: &'static str = "app";

    fn render_route(&self, context: &GenerationContext) -> GeneratedFile {
        let mut out = String::new();
        out.push_str(GENERATED_MARKER);
        out.push('\n');
        out.push_str(&format!("import {{ createRoute }} from \"{}\";\n", RUNTIME_MODULE));
        out.push_str(&config_imports(&context.configs, false));
        out.push('\n');
        for config in &context.configs {
            out.push_str(&format!(
                "export const {} = createRoute({});\n",
                config.method.as_upper(),
                config_alias(config.method)
            ));
        }
        GeneratedFile::new(ROUTE_FILE, out)
    }

    /// Imports shared by both directive-led files.
    fn server_preamble(&self, context: &GenerationContext) -> String {
        let mut out = String::new();
        out.push_str(SERVER_DIRECTIVE);
        out.push('\n');
        out.push_str(GENERATED_MARKER);
        out.push('\n');
        out.push_str(&format!("import {{ invokeHandler }} from \"{}\";\n", RUNTIME_MODULE));
        out.push_str(&config_imports(context.body_methods(), false));
        out.push_str(&client_type_import(context));
        out
    }

    fn render_actions(&self, context: &GenerationContext) -> GeneratedFile {
        let resource = context.resource_name();
        let mut out = self.server_preamble(context);

        for config in context.body_methods() {
            out.push_str(&format!(
                "\nexport async function {}(input: {}): Promise<{}> {{\n  \
                 return invokeHandler({}, input);\n}}\n",
                action_name(config.method, &resource),
                input_type_name(config.method, &resource),
                response_type_name(config.method, &resource),
                config_alias(config.method),
            ));
        }

        GeneratedFile::new(ACTIONS_FILE, out)
    }

    fn render_form_actions(&self, context: &GenerationContext) -> GeneratedFile {
        let resource = context.resource_name();
        let mut out = self.server_preamble(context);
        out.push_str(FORM_READERS);

        for config in context.body_methods() {
            out.push_str(&format!(
                "\nexport async function {}(formData: FormData): Promise<{}> {{\n",
                form_action_name(config.method, &resource),
                response_type_name(config.method, &resource),
            ));
            out.push_str("  const input = {\n");
            out.push_str(&form_input_object(context, config));
            out.push_str("  };\n");
            out.push_str(&format!(
                "  return invokeHandler({}, input as {});\n}}\n",
                config_alias(config.method),
                input_type_name(config.method, &resource),
            ));
        }

        GeneratedFile::new(FORM_ACTIONS_FILE, out)
    }

    fn render_action_hooks(&self, context: &GenerationContext) -> GeneratedFile {
        let resource = context.resource_name();
        let mut out = String::new();
        out.push_str(GENERATED_MARKER);
        out.push('\n');
        out.push_str("import { useCallback, useState } from \"react\";\n");

        let actions: Vec<String> = context
            .body_methods()
            .map(|config| action_name(config.method, &resource))
            .collect();
        out.push_str(&format!(
            "import {{ {} }} from \"./actions\";\n",
            actions.join(", ")
        ));
        out.push_str(&client_type_import(context));

        for config in context.body_methods() {
            let input_type = input_type_name(config.method, &resource);
            let shape = InputShape::of(context, config);
            out.push('\n');
            out.push_str(&shared::mutation_hook(
                &format!("{}Action", hook_name(config.method, &resource)),
                "execute",
                &shape.parameter("input", &input_type),
                &format!("{}(input)", action_name(config.method, &resource)),
                &response_type_name(config.method, &resource),
            ));
        }

        GeneratedFile::new(ACTION_HOOKS_FILE, out)
    }

    fn render_form_action_hooks(&self, context: &GenerationContext) -> GeneratedFile {
        let resource = context.resource_name();
        let mut out = String::new();
        out.push_str(GENERATED_MARKER);
        out.push('\n');
        out.push_str("import { useCallback, useState } from \"react\";\n");

        let actions: Vec<String> = context
            .body_methods()
            .map(|config| form_action_name(config.method, &resource))
            .collect();
        out.push_str(&format!(
            "import {{ {} }} from \"./form-actions\";\n",
            actions.join(", ")
        ));
        out.push_str(&client_type_import(context));

        for config in context.body_methods() {
            out.push('\n');
            out.push_str(&shared::mutation_hook(
                &format!("{}FormAction", hook_name(config.method, &resource)),
                "submit",
                "formData: FormData",
                &format!("{}(formData)", form_action_name(config.method, &resource)),
                &response_type_name(config.method, &resource),
            ));
        }

        GeneratedFile::new(FORM_ACTION_HOOKS_FILE, out)
    }
}

/// Input and response types of every body method, imported from the client.
fn client_type_import(context: &GenerationContext) -> String {
    let resource = context.resource_name();
    let mut types: Vec<String> = Vec::new();
    for config in context.body_methods() {
        types.push(input_type_name(config.method, &resource));
        types.push(response_type_name(config.method, &resource));
    }
    format!("import type {{ {} }} from \"./client\";\n", types.join(", "))
}

const FORM_READERS: &str = r#"
function readString(formData: FormData, key: string): string | undefined {
  const value = formData.get(key);
  return typeof value === "string" && value !== "" ? value : undefined;
}

function readNumber(formData: FormData, key: string): number | undefined {
  const value = readString(formData, key);
  return value === undefined ? undefined : Number(value);
}

function readBoolean(formData: FormData, key: string): boolean {
  const value = formData.get(key);
  return value === "on" || value === "true";
}

function readPrefixed(formData: FormData, prefix: string): Record<string, FormDataEntryValue> {
  const values: Record<string, FormDataEntryValue> = {};
  for (const [key, value] of formData.entries()) {
    if (key.startsWith(prefix)) values[key.slice(prefix.length)] = value;
  }
  return values;
}
"#;

/// Expression reading one field from submitted form data.
fn form_value(facet: &str, field: &FieldDescriptor) -> String {
    let reader = match field.zod_type {
        ZodType::Number => "readNumber",
        ZodType::Boolean => "readBoolean",
        ZodType::String | ZodType::Other(_) => "readString",
    };
    format!("{}(formData, {:?})", reader, format!("{}.{}", facet, field.name))
}

/// Facet object literal: one property per field, or every prefixed entry
/// when the facet's fields could not be resolved.
fn facet_object(facet: &str, fields: &[FieldDescriptor]) -> String {
    if fields.is_empty() {
        return format!("readPrefixed(formData, {:?})", format!("{}.", facet));
    }
    let mut out = String::from("{\n");
    for field in fields {
        out.push_str(&format!(
            "      {:?}: {},\n",
            field.name,
            form_value(facet, field)
        ));
    }
    out.push_str("    }");
    out
}

fn form_input_object(context: &GenerationContext, config: &RouteDescriptor) -> String {
    let mut out = String::new();
    if config.has_body {
        out.push_str(&format!(
            "    body: {},\n",
            facet_object("body", &config.body_fields)
        ));
    }
    let params = param_fields(context, config);
    if config.has_params || !params.is_empty() {
        out.push_str(&format!("    params: {},\n", facet_object("params", &params)));
    }
    out
}

impl FrameworkGenerator for AppRouterGenerator {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> &'static str {
        "Next.js App Router: named method exports, server actions and form actions"
    }

    fn root_marker(&self) -> &'static str {
        Self::ROOT_MARKER
    }

    fn resolve_route_path(&self, directory: &Path) -> String {
        route_path_after_marker(directory, Self::ROOT_MARKER, is_route_group_or_slot)
    }

    fn generate(&self, context: &GenerationContext) -> Vec<GeneratedFile> {
        let mut files = vec![self.render_route(context), shared::render_client(context)];
        files.extend(
            context
                .configs
                .iter()
                .map(|config| shared::render_hook(context, config)),
        );

        if context.has_body_method() {
            files.push(self.render_actions(context));
            files.push(self.render_form_actions(context));
            files.push(self.render_action_hooks(context));
            files.push(self.render_form_action_hooks(context));
            files.extend(shared::render_form_fields(context));
        }

        tracing::debug!(
            generator = Self::NAME,
            route = %context.route_path,
            files = files.len(),
            "rendered route artifacts"
        );

        files
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HttpMethod;

    fn file<'a>(files: &'a [GeneratedFile], name: &str) -> &'a GeneratedFile {
        files
            .iter()
            .find(|f| f.file_name == name)
            .unwrap_or_else(|| panic!("missing {}", name))
    }

    fn names(files: &[GeneratedFile]) -> Vec<&str> {
        files.iter().map(|f| f.file_name.as_str()).collect()
    }

    fn body_context() -> GenerationContext {
        let mut post = RouteDescriptor::empty(HttpMethod::Post, "route.post.config.ts");
        post.has_body = true;
        post.body_fields = vec![
            FieldDescriptor::new("title", ZodType::String),
            FieldDescriptor::new("views", ZodType::Number),
            FieldDescriptor::new("draft", ZodType::Boolean),
        ];
        GenerationContext::new(
            "src/app/api/posts/[postId]",
            "/api/posts/[postId]",
            vec![
                RouteDescriptor::empty(HttpMethod::Get, "route.get.config.ts"),
                post,
            ],
        )
    }

    #[test]
    fn test_resolve_route_path() {
        let generator = AppRouterGenerator;
        assert_eq!(
            generator.resolve_route_path(Path::new("src/app/api/posts/[postId]")),
            "/api/posts/[postId]"
        );
        assert_eq!(
            generator.resolve_route_path(Path::new("app/(marketing)/@modal/api/contact")),
            "/api/contact"
        );
        assert_eq!(
            generator.resolve_route_path(Path::new("api/health")),
            "/api/health"
        );
    }

    #[test]
    fn test_get_only_route_emits_three_files() {
        let context = GenerationContext::new(
            "app/api/health",
            "/api/health",
            vec![RouteDescriptor::empty(HttpMethod::Get, "route.get.config.ts")],
        );
        let files = AppRouterGenerator.generate(&context);
        assert_eq!(names(&files), vec!["route.ts", "client.ts", "use-get.ts"]);
    }

    #[test]
    fn test_body_route_emits_server_files() {
        let files = AppRouterGenerator.generate(&body_context());
        assert_eq!(
            names(&files),
            vec![
                "route.ts",
                "client.ts",
                "use-get.ts",
                "use-post.ts",
                "actions.ts",
                "form-actions.ts",
                "use-actions.ts",
                "use-form-actions.ts",
                "form-fields.tsx",
            ]
        );
    }

    #[test]
    fn test_route_entry_has_named_exports() {
        let files = AppRouterGenerator.generate(&body_context());
        let route = &file(&files, ROUTE_FILE).content;
        assert!(route.starts_with(GENERATED_MARKER));
        assert!(route.contains("import * as getConfig from \"../route.get.config\";"));
        assert!(route.contains("export const GET = createRoute(getConfig);"));
        assert!(route.contains("export const POST = createRoute(postConfig);"));
        assert!(!route.contains("export default"));
    }

    #[test]
    fn test_directive_is_first_line_of_server_files() {
        let files = AppRouterGenerator.generate(&body_context());
        for name in [ACTIONS_FILE, FORM_ACTIONS_FILE] {
            let content = &file(&files, name).content;
            let mut lines = content.lines();
            assert_eq!(lines.next(), Some(SERVER_DIRECTIVE), "{}", name);
            assert_eq!(lines.next(), Some(GENERATED_MARKER), "{}", name);
        }
        for generated in &files {
            if generated.file_name != ACTIONS_FILE && generated.file_name != FORM_ACTIONS_FILE {
                assert!(
                    generated.content.starts_with(GENERATED_MARKER),
                    "{}",
                    generated.file_name
                );
            }
        }
    }

    #[test]
    fn test_actions_wrap_only_body_methods() {
        let files = AppRouterGenerator.generate(&body_context());
        let actions = &file(&files, ACTIONS_FILE).content;
        assert!(actions.contains(
            "export async function postPostsAction(input: PostPostsInput): Promise<PostPostsResponse> {"
        ));
        assert!(actions.contains("return invokeHandler(postConfig, input);"));
        assert!(!actions.contains("getConfig"));
    }

    #[test]
    fn test_form_action_reads_dot_paths() {
        let files = AppRouterGenerator.generate(&body_context());
        let form_actions = &file(&files, FORM_ACTIONS_FILE).content;
        assert!(form_actions.contains("\"title\": readString(formData, \"body.title\"),"));
        assert!(form_actions.contains("\"views\": readNumber(formData, \"body.views\"),"));
        assert!(form_actions.contains("\"draft\": readBoolean(formData, \"body.draft\"),"));
        assert!(form_actions.contains("\"postId\": readString(formData, \"params.postId\"),"));
        assert!(form_actions.contains("return invokeHandler(postConfig, input as PostPostsInput);"));
    }

    #[test]
    fn test_every_form_action_read_has_a_rendered_input() {
        let files = AppRouterGenerator.generate(&body_context());
        let form_actions = &file(&files, FORM_ACTIONS_FILE).content;
        let form_fields = &file(&files, shared::FORM_FIELDS_FILE).content;

        let reads = regex::Regex::new(r#"read(?:String|Number|Boolean)\(formData, "([^"]+)"\)"#)
            .unwrap();
        let read_paths: Vec<_> = reads
            .captures_iter(form_actions)
            .map(|c| c[1].to_string())
            .collect();
        assert!(read_paths.contains(&"params.postId".to_string()));

        for path in &read_paths {
            assert!(
                form_fields.contains(&format!("name=\"{}\"", path)),
                "form-fields.tsx has no input for {}",
                path
            );
        }
    }

    #[test]
    fn test_form_action_unresolved_body_reads_prefix() {
        let mut put = RouteDescriptor::empty(HttpMethod::Put, "route.put.config.ts");
        put.has_body = true;
        let context = GenerationContext::new("app/api/items", "/api/items", vec![put]);
        let files = AppRouterGenerator.generate(&context);
        let form_actions = &file(&files, FORM_ACTIONS_FILE).content;
        assert!(form_actions.contains("body: readPrefixed(formData, \"body.\"),"));
        assert!(!form_actions.contains("params:"));
    }

    #[test]
    fn test_action_hooks() {
        let files = AppRouterGenerator.generate(&body_context());
        let hooks = &file(&files, ACTION_HOOKS_FILE).content;
        assert!(hooks.contains("import { postPostsAction } from \"./actions\";"));
        assert!(hooks.contains("export function usePostPostsAction()"));
        assert!(hooks.contains("const execute = useCallback"));

        let form_hooks = &file(&files, FORM_ACTION_HOOKS_FILE).content;
        assert!(form_hooks.contains("export function usePostPostsFormAction()"));
        assert!(form_hooks.contains("const submit = useCallback(async (formData: FormData)"));
    }
}
