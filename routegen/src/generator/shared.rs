//! String building shared by every framework generator.
//!
//! The client, the data-fetching hooks and the form-fields file look the
//! same under both conventions, so they are rendered here. Generators only
//! add their own route entry and convention-specific files.

use crate::generator::traits::GenerationContext;
use crate::naming::{
    build_fetch_url_expression, field_name_to_label, pascal_case, zod_type_to_input_type,
    zod_type_to_ts_type,
};
use crate::types::{FieldDescriptor, GeneratedFile, HttpMethod, RouteDescriptor, ZodType};

/// Leading line of every generated TypeScript file.
pub const GENERATED_MARKER: &str = "// @generated by routegen. Do not edit.";

/// Module providing `createRoute`, `createPagesRoute` and `invokeHandler`.
pub const RUNTIME_MODULE: &str = "@routegen/next";

/// First line of files whose exports run on the server.
pub const SERVER_DIRECTIVE: &str = "\"use server\";";

pub const CLIENT_FILE: &str = "client.ts";
pub const FORM_FIELDS_FILE: &str = "form-fields.tsx";

// =============================================================================
// Names
// =============================================================================

/// Namespace alias a descriptor module is imported under: `getConfig`.
pub fn config_alias(method: HttpMethod) -> String {
    format!("{}Config", method.as_str())
}

pub fn hook_file_name(method: HttpMethod) -> String {
    format!("use-{}.ts", method.as_str())
}

/// `Get` + `Posts` style prefix shared by per-method names.
fn method_prefix(method: HttpMethod, resource: &str) -> String {
    format!("{}{}", pascal_case(method.as_str()), resource)
}

pub fn input_type_name(method: HttpMethod, resource: &str) -> String {
    format!("{}Input", method_prefix(method, resource))
}

pub fn response_type_name(method: HttpMethod, resource: &str) -> String {
    format!("{}Response", method_prefix(method, resource))
}

pub fn hook_name(method: HttpMethod, resource: &str) -> String {
    format!("use{}", method_prefix(method, resource))
}

pub fn client_class_name(resource: &str) -> String {
    format!("{}Client", resource)
}

pub fn action_name(method: HttpMethod, resource: &str) -> String {
    format!("{}{}Action", method.as_str(), resource)
}

pub fn form_action_name(method: HttpMethod, resource: &str) -> String {
    format!("{}{}FormAction", method.as_str(), resource)
}

pub fn form_fields_component_name(method: HttpMethod, resource: &str) -> String {
    format!("{}FormFields", method_prefix(method, resource))
}

// =============================================================================
// Imports
// =============================================================================

/// `import * as getConfig from "../route.get.config";` per descriptor.
pub fn config_imports<'a>(
    configs: impl IntoIterator<Item = &'a RouteDescriptor>,
    type_only: bool,
) -> String {
    let keyword = if type_only { "import type" } else { "import" };
    configs
        .into_iter()
        .map(|config| {
            format!(
                "{} * as {} from \"{}\";\n",
                keyword,
                config_alias(config.method),
                config.module_specifier()
            )
        })
        .collect()
}

// =============================================================================
// Types
// =============================================================================

/// Quote a property name when it is not a plain identifier.
fn property_key(name: &str) -> String {
    let plain = name
        .chars()
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$')
        && name.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '$');
    if plain {
        name.to_string()
    } else {
        format!("{:?}", name)
    }
}

/// Inline object type for a field list; a declared facet without
/// resolvable fields becomes a loose record.
pub fn ts_object_type(fields: &[FieldDescriptor]) -> String {
    if fields.is_empty() {
        return "Record<string, unknown>".to_string();
    }
    let members: Vec<String> = fields
        .iter()
        .map(|field| {
            format!(
                "{}{}: {}",
                property_key(&field.name),
                if field.optional { "?" } else { "" },
                zod_type_to_ts_type(&field.zod_type)
            )
        })
        .collect();
    format!("{{ {} }}", members.join("; "))
}

/// Path params of a route: dynamic segments first, then any extra declared
/// param fields. A segment also declared as a field takes the field's type.
pub fn param_fields(context: &GenerationContext, config: &RouteDescriptor) -> Vec<FieldDescriptor> {
    let mut fields: Vec<FieldDescriptor> = context
        .dynamic_segments()
        .into_iter()
        .map(|segment| {
            config
                .param_fields
                .iter()
                .find(|field| field.name == segment)
                .cloned()
                .unwrap_or_else(|| FieldDescriptor::new(segment, ZodType::String))
        })
        .collect();

    for field in &config.param_fields {
        if !fields.iter().any(|existing| existing.name == field.name) {
            fields.push(field.clone());
        }
    }

    fields
}

/// Shape of one method's input object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputShape {
    pub has_params: bool,
    pub members: Vec<String>,
    /// At least one member must be supplied by the caller.
    pub required: bool,
}

impl InputShape {
    pub fn of(context: &GenerationContext, config: &RouteDescriptor) -> Self {
        let mut members = Vec::new();
        let mut required = false;

        let params = param_fields(context, config);
        let has_params = config.has_params || !params.is_empty();
        if has_params {
            members.push(format!("params: {};", ts_object_type(&params)));
            required = true;
        }
        if config.has_body {
            members.push(format!("body: {};", ts_object_type(&config.body_fields)));
            required = true;
        }
        if config.has_search_params {
            members.push(format!(
                "searchParams?: {};",
                ts_object_type(&config.search_param_fields)
            ));
        }
        if config.has_headers {
            members.push(format!(
                "headers?: {};",
                ts_object_type(&config.header_fields)
            ));
        }

        Self {
            has_params,
            members,
            required,
        }
    }

    /// Parameter declaration: `input: T` or `input: T = {}`.
    pub fn parameter(&self, name: &str, type_name: &str) -> String {
        if self.required {
            format!("{}: {}", name, type_name)
        } else {
            format!("{}: {} = {{}}", name, type_name)
        }
    }
}

// =============================================================================
// Client
// =============================================================================

const CLIENT_REQUEST_HELPER: &str = r#"  private async request<T>(
    method: string,
    path: string,
    init: RequestParts,
    options: RequestOptions,
  ): Promise<T> {
    const query = new URLSearchParams();
    for (const [key, value] of Object.entries(init.searchParams ?? {})) {
      if (value !== undefined && value !== null) query.set(key, String(value));
    }
    const search = query.toString();

    const headers: Record<string, string> = {};
    for (const [key, value] of Object.entries({ ...init.headers, ...options.headers })) {
      if (value !== undefined && value !== null) headers[key] = String(value);
    }
    if (init.body !== undefined) headers["Content-Type"] = "application/json";

    const response = await fetch(`${this.baseUrl}${path}${search ? `?${search}` : ""}`, {
      method,
      headers,
      body: init.body === undefined ? undefined : JSON.stringify(init.body),
      signal: options.signal,
    });
    if (!response.ok) {
      throw new Error(`${method} ${path} failed with status ${response.status}`);
    }
    if (response.status === 204) return undefined as T;
    return (await response.json()) as T;
  }
"#;

const CLIENT_SUPPORT_TYPES: &str = r#"export interface RequestOptions {
  signal?: AbortSignal;
  headers?: Record<string, string>;
}

interface RequestParts {
  body?: unknown;
  searchParams?: Record<string, unknown>;
  headers?: Record<string, unknown>;
}
"#;

fn client_method(context: &GenerationContext, config: &RouteDescriptor) -> String {
    let resource = context.resource_name();
    let shape = InputShape::of(context, config);
    let input_type = input_type_name(config.method, &resource);
    let response_type = response_type_name(config.method, &resource);

    let url = if shape.has_params {
        build_fetch_url_expression(&context.route_path, "input.params")
    } else {
        build_fetch_url_expression(&context.route_path, "")
    };

    let mut parts = Vec::new();
    if config.has_body {
        parts.push("body: input.body");
    }
    if config.has_search_params {
        parts.push("searchParams: input.searchParams");
    }
    if config.has_headers {
        parts.push("headers: input.headers");
    }

    let uses_input =
        (shape.has_params && !context.dynamic_segments().is_empty()) || !parts.is_empty();
    let parameter = shape.parameter(if uses_input { "input" } else { "_input" }, &input_type);
    let init = if parts.is_empty() {
        "{}".to_string()
    } else {
        format!("{{ {} }}", parts.join(", "))
    };

    format!(
        "  async {method}({parameter}, options: RequestOptions = {{}}): Promise<{response}> {{\n    \
         return this.request<{response}>(\"{upper}\", {url}, {init}, options);\n  }}\n",
        method = config.method.as_str(),
        parameter = parameter,
        response = response_type,
        upper = config.method.as_upper(),
        url = url,
        init = init,
    )
}

/// Typed client: one input/response type pair and one async method per
/// declared method.
pub fn render_client(context: &GenerationContext) -> GeneratedFile {
    let resource = context.resource_name();
    let mut out = String::new();

    out.push_str(GENERATED_MARKER);
    out.push('\n');
    out.push_str("import type { z } from \"zod\";\n");
    out.push_str(&config_imports(&context.configs, true));
    out.push('\n');

    for config in &context.configs {
        let shape = InputShape::of(context, config);
        let input_type = input_type_name(config.method, &resource);
        if shape.members.is_empty() {
            out.push_str(&format!("export interface {} {{}}\n\n", input_type));
        } else {
            out.push_str(&format!("export interface {} {{\n", input_type));
            for member in &shape.members {
                out.push_str(&format!("  {}\n", member));
            }
            out.push_str("}\n\n");
        }
        out.push_str(&format!(
            "export type {} = z.infer<typeof {}.responseValidator>;\n\n",
            response_type_name(config.method, &resource),
            config_alias(config.method)
        ));
    }

    out.push_str(CLIENT_SUPPORT_TYPES);
    out.push('\n');
    out.push_str(&format!("export class {} {{\n", client_class_name(&resource)));
    out.push_str("  constructor(private readonly baseUrl: string = \"\") {}\n\n");
    for config in &context.configs {
        out.push_str(&client_method(context, config));
        out.push('\n');
    }
    out.push_str(CLIENT_REQUEST_HELPER);
    out.push_str("}\n");

    GeneratedFile::new(CLIENT_FILE, out)
}

// =============================================================================
// Hooks
// =============================================================================

/// Body of a hook exposing `{ <invoke>, data, error, isLoading }` around an
/// async call.
pub fn mutation_hook(
    hook: &str,
    invoke: &str,
    parameter: &str,
    call: &str,
    response_type: &str,
) -> String {
    format!(
        r#"export function {hook}() {{
  const [data, setData] = useState<{response} | undefined>(undefined);
  const [error, setError] = useState<Error | null>(null);
  const [isLoading, setIsLoading] = useState(false);

  const {invoke} = useCallback(async ({parameter}) => {{
    setIsLoading(true);
    setError(null);
    try {{
      const result = await {call};
      setData(result);
      return result;
    }} catch (err) {{
      const failure = err instanceof Error ? err : new Error(String(err));
      setError(failure);
      throw failure;
    }} finally {{
      setIsLoading(false);
    }}
  }}, []);

  return {{ {invoke}, data, error, isLoading }};
}}
"#,
        hook = hook,
        response = response_type,
        invoke = invoke,
        parameter = parameter,
        call = call,
    )
}

fn query_hook(context: &GenerationContext, config: &RouteDescriptor) -> String {
    let resource = context.resource_name();
    let shape = InputShape::of(context, config);
    let input_type = input_type_name(config.method, &resource);

    format!(
        r#"export function {hook}({parameter}) {{
  const [data, setData] = useState<{response} | undefined>(undefined);
  const [error, setError] = useState<Error | null>(null);
  const [isLoading, setIsLoading] = useState(true);
  const controllerRef = useRef<AbortController | null>(null);
  const inputKey = JSON.stringify(input);

  const refetch = useCallback(async () => {{
    controllerRef.current?.abort();
    const controller = new AbortController();
    controllerRef.current = controller;
    setIsLoading(true);
    setError(null);
    try {{
      const result = await client.{method}(JSON.parse(inputKey) as {input_type}, {{
        signal: controller.signal,
      }});
      if (!controller.signal.aborted) setData(result);
    }} catch (err) {{
      if (!controller.signal.aborted) {{
        setError(err instanceof Error ? err : new Error(String(err)));
      }}
    }} finally {{
      if (!controller.signal.aborted) setIsLoading(false);
    }}
  }}, [inputKey]);

  useEffect(() => {{
    void refetch();
    return () => controllerRef.current?.abort();
  }}, [refetch]);

  return {{ data, error, isLoading, refetch }};
}}
"#,
        hook = hook_name(config.method, &resource),
        parameter = shape.parameter("input", &input_type),
        response = response_type_name(config.method, &resource),
        method = config.method.as_str(),
        input_type = input_type,
    )
}

/// Data-fetching hook file for one method: auto-fetching for GET,
/// mutation-style otherwise.
pub fn render_hook(context: &GenerationContext, config: &RouteDescriptor) -> GeneratedFile {
    let resource = context.resource_name();
    let input_type = input_type_name(config.method, &resource);
    let response_type = response_type_name(config.method, &resource);
    let react_imports = if config.method.is_query() {
        "useCallback, useEffect, useRef, useState"
    } else {
        "useCallback, useState"
    };

    let mut out = String::new();
    out.push_str(GENERATED_MARKER);
    out.push('\n');
    out.push_str(&format!("import {{ {} }} from \"react\";\n", react_imports));
    out.push_str(&format!(
        "import {{ {}, type {}, type {} }} from \"./client\";\n\n",
        client_class_name(&resource),
        input_type,
        response_type
    ));
    out.push_str(&format!(
        "const client = new {}();\n\n",
        client_class_name(&resource)
    ));

    if config.method.is_query() {
        out.push_str(&query_hook(context, config));
    } else {
        let shape = InputShape::of(context, config);
        out.push_str(&mutation_hook(
            &hook_name(config.method, &resource),
            "mutate",
            &shape.parameter("input", &input_type),
            &format!("client.{}(input)", config.method.as_str()),
            &response_type,
        ));
    }

    GeneratedFile::new(hook_file_name(config.method), out)
}

// =============================================================================
// Forms
// =============================================================================

/// One labelled input of a body method's form, keyed by dot-path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormInput {
    /// `body.<field>` or `params.<field>`.
    pub path: String,
    pub label: String,
    pub input_type: &'static str,
    pub required: bool,
}

impl FormInput {
    fn new(facet: &str, field: &FieldDescriptor) -> Self {
        let input_type = zod_type_to_input_type(&field.zod_type);
        Self {
            path: format!("{}.{}", facet, field.name),
            label: field_name_to_label(&field.name),
            input_type,
            required: !field.optional && input_type != "checkbox",
        }
    }
}

/// Inputs for every body field, then every path param (dynamic segments and
/// declared param fields, as merged by [`param_fields`]).
pub fn form_inputs(context: &GenerationContext, config: &RouteDescriptor) -> Vec<FormInput> {
    config
        .body_fields
        .iter()
        .map(|field| FormInput::new("body", field))
        .chain(
            param_fields(context, config)
                .iter()
                .map(|field| FormInput::new("params", field)),
        )
        .collect()
}

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn form_component(context: &GenerationContext, config: &RouteDescriptor) -> String {
    let resource = context.resource_name();
    let component = form_fields_component_name(config.method, &resource);
    let inputs = form_inputs(context, config);

    let mut out = String::new();
    out.push_str(&format!(
        "export const {}Definitions: FormFieldDefinition[] = [\n",
        crate::naming::camel_case(&component)
    ));
    for input in &inputs {
        out.push_str(&format!(
            "  {{ name: {:?}, label: {:?}, type: {:?}, required: {} }},\n",
            input.path, input.label, input.input_type, input.required
        ));
    }
    out.push_str("];\n\n");

    out.push_str(&format!("export function {}() {{\n  return (\n    <>\n", component));
    for input in &inputs {
        let path = escape_attr(&input.path);
        out.push_str("      <div>\n");
        out.push_str(&format!(
            "        <label htmlFor=\"{}\">{}</label>\n",
            path,
            escape_attr(&input.label)
        ));
        out.push_str(&format!(
            "        <input id=\"{}\" name=\"{}\" type=\"{}\"{} />\n",
            path,
            path,
            input.input_type,
            if input.required { " required" } else { "" }
        ));
        out.push_str("      </div>\n");
    }
    out.push_str("    </>\n  );\n}\n");

    out
}

/// Form-fields file with one component per body method, or `None` when no
/// declared method has a body.
pub fn render_form_fields(context: &GenerationContext) -> Option<GeneratedFile> {
    if !context.has_body_method() {
        return None;
    }

    let mut out = String::new();
    out.push_str(GENERATED_MARKER);
    out.push('\n');
    out.push_str(
        "export interface FormFieldDefinition {\n  name: string;\n  label: string;\n  \
         type: \"text\" | \"number\" | \"checkbox\";\n  required: boolean;\n}\n",
    );
    for config in context.body_methods() {
        out.push('\n');
        out.push_str(&form_component(context, config));
    }

    Some(GeneratedFile::new(FORM_FIELDS_FILE, out))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post_context() -> GenerationContext {
        let mut post = RouteDescriptor::empty(HttpMethod::Post, "route.post.config.ts");
        post.has_body = true;
        post.body_fields = vec![
            FieldDescriptor::new("title", ZodType::String),
            FieldDescriptor::new("views", ZodType::Number).optional(),
            FieldDescriptor::new("published", ZodType::Boolean),
        ];
        post.has_params = true;
        post.param_fields = vec![FieldDescriptor::new("postId", ZodType::Number)];
        GenerationContext::new(
            "app/api/posts/[postId]",
            "/api/posts/[postId]",
            vec![
                RouteDescriptor::empty(HttpMethod::Get, "route.get.config.ts"),
                post,
            ],
        )
    }

    #[test]
    fn test_names() {
        assert_eq!(config_alias(HttpMethod::Delete), "deleteConfig");
        assert_eq!(hook_file_name(HttpMethod::Patch), "use-patch.ts");
        assert_eq!(input_type_name(HttpMethod::Get, "Posts"), "GetPostsInput");
        assert_eq!(hook_name(HttpMethod::Post, "Posts"), "usePostPosts");
        assert_eq!(action_name(HttpMethod::Put, "Posts"), "putPostsAction");
    }

    #[test]
    fn test_ts_object_type() {
        let fields = vec![
            FieldDescriptor::new("title", ZodType::String),
            FieldDescriptor::new("x-key", ZodType::Other("enum".to_string())).optional(),
        ];
        assert_eq!(
            ts_object_type(&fields),
            "{ title: string; \"x-key\"?: unknown }"
        );
        assert_eq!(ts_object_type(&[]), "Record<string, unknown>");
    }

    #[test]
    fn test_param_fields_merge_segments_and_declared() {
        let context = post_context();
        let fields = param_fields(&context, &context.configs[1]);
        assert_eq!(fields, vec![FieldDescriptor::new("postId", ZodType::Number)]);

        let fields = param_fields(&context, &context.configs[0]);
        assert_eq!(fields, vec![FieldDescriptor::new("postId", ZodType::String)]);
    }

    #[test]
    fn test_input_shape_without_members_is_optional() {
        let context = GenerationContext::new(
            "app/api/health",
            "/api/health",
            vec![RouteDescriptor::empty(HttpMethod::Get, "route.get.config.ts")],
        );
        let shape = InputShape::of(&context, &context.configs[0]);
        assert!(!shape.required);
        assert!(shape.members.is_empty());
        assert_eq!(
            shape.parameter("input", "GetHealthInput"),
            "input: GetHealthInput = {}"
        );
    }

    #[test]
    fn test_client_substitutes_dynamic_segments() {
        let client = render_client(&post_context());
        assert_eq!(client.file_name, "client.ts");
        assert!(client.content.starts_with(GENERATED_MARKER));
        assert!(client.content.contains("export class PostsClient {"));
        assert!(client
            .content
            .contains("return this.request<GetPostsResponse>(\"GET\", `/api/posts/${input.params.postId}`, {}, options);"));
        assert!(client.content.contains("body: { title: string; views?: number; published: boolean };"));
        assert!(client.content.contains("import type * as postConfig from \"../route.post.config\";"));
    }

    #[test]
    fn test_client_without_inputs_uses_plain_url() {
        let context = GenerationContext::new(
            "app/api/health",
            "/api/health",
            vec![RouteDescriptor::empty(HttpMethod::Get, "route.get.config.ts")],
        );
        let client = render_client(&context);
        assert!(client
            .content
            .contains("async get(_input: GetHealthInput = {}, options: RequestOptions = {})"));
        assert!(client.content.contains("(\"GET\", `/api/health`, {}, options)"));
    }

    #[test]
    fn test_query_and_mutation_hooks() {
        let context = post_context();
        let get_hook = render_hook(&context, &context.configs[0]);
        assert_eq!(get_hook.file_name, "use-get.ts");
        assert!(get_hook.content.contains("export function useGetPosts(input: GetPostsInput)"));
        assert!(get_hook.content.contains("refetch"));
        assert!(get_hook.content.contains("controllerRef.current?.abort()"));

        let post_hook = render_hook(&context, &context.configs[1]);
        assert_eq!(post_hook.file_name, "use-post.ts");
        assert!(post_hook.content.contains("export function usePostPosts()"));
        assert!(post_hook.content.contains("const mutate = useCallback(async (input: PostPostsInput)"));
        assert!(!post_hook.content.contains("useEffect"));
    }

    #[test]
    fn test_form_inputs_keyed_by_dot_path() {
        let context = post_context();
        let inputs = form_inputs(&context, &context.configs[1]);
        let paths: Vec<_> = inputs.iter().map(|i| i.path.as_str()).collect();
        assert_eq!(
            paths,
            vec!["body.title", "body.views", "body.published", "params.postId"]
        );
        assert!(inputs[0].required);
        assert!(!inputs[1].required);
        assert_eq!(inputs[2].input_type, "checkbox");
        assert!(!inputs[2].required);
        assert_eq!(inputs[3].label, "Post Id");
    }

    #[test]
    fn test_form_fields_file() {
        let file = render_form_fields(&post_context()).unwrap();
        assert_eq!(file.file_name, "form-fields.tsx");
        assert!(file.content.contains("export function PostPostsFormFields()"));
        assert!(file
            .content
            .contains("<input id=\"body.title\" name=\"body.title\" type=\"text\" required />"));
        assert!(file
            .content
            .contains("<label htmlFor=\"params.postId\">Post Id</label>"));
    }

    #[test]
    fn test_form_inputs_include_undeclared_dynamic_segments() {
        let mut post = RouteDescriptor::empty(HttpMethod::Post, "route.post.config.ts");
        post.has_body = true;
        post.body_fields = vec![FieldDescriptor::new("title", ZodType::String)];
        let context = GenerationContext::new(
            "app/api/orgs/[orgId]/posts/[postId]",
            "/api/orgs/[orgId]/posts/[postId]",
            vec![post],
        );

        let inputs = form_inputs(&context, &context.configs[0]);
        let paths: Vec<_> = inputs.iter().map(|i| i.path.as_str()).collect();
        assert_eq!(paths, vec!["body.title", "params.orgId", "params.postId"]);
        assert!(inputs[1].required);
        assert_eq!(inputs[1].input_type, "text");
    }

    #[test]
    fn test_form_fields_absent_without_body_method() {
        let context = GenerationContext::new(
            "app/api/health",
            "/api/health",
            vec![RouteDescriptor::empty(HttpMethod::Get, "route.get.config.ts")],
        );
        assert!(render_form_fields(&context).is_none());
    }
}
