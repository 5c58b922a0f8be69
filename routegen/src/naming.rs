//! Identifier casing, label humanization and route path helpers.
//!
//! These are plain string transforms with no locale handling; non-ASCII
//! characters pass through unchanged.

use crate::types::ZodType;

/// Upper-case the first character, leaving the rest untouched.
fn capitalize(segment: &str) -> String {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn lower_first(segment: &str) -> String {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `add-admin` / `add_admin` -> `AddAdmin`.
pub fn pascal_case(id: &str) -> String {
    id.split(['-', '_'])
        .filter(|segment| !segment.is_empty())
        .map(capitalize)
        .collect()
}

/// `add-admin` / `add_admin` -> `addAdmin`.
pub fn camel_case(id: &str) -> String {
    lower_first(&pascal_case(id))
}

/// Split a camelCase identifier into title-cased words: `postId` -> `Post Id`.
pub fn field_name_to_label(id: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;

    for ch in id.chars() {
        if prev_lower && ch.is_uppercase() && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        prev_lower = ch.is_lowercase();
        current.push(ch);
    }
    if !current.is_empty() {
        words.push(current);
    }

    words
        .iter()
        .map(|word| capitalize(word))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Name inside a `[segment]` path component, if it is one.
///
/// Catch-all forms (`[...slug]`, `[[...slug]]`) yield the bare name.
pub fn dynamic_segment_name(segment: &str) -> Option<&str> {
    let inner = segment.strip_prefix('[')?.strip_suffix(']')?;
    let inner = inner
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .unwrap_or(inner);
    let inner = inner.strip_prefix("...").unwrap_or(inner);
    if inner.is_empty() {
        None
    } else {
        Some(inner)
    }
}

/// Every bracket-delimited segment name in `route_path`, left to right.
pub fn extract_dynamic_segments(route_path: &str) -> Vec<String> {
    route_path
        .split('/')
        .filter_map(dynamic_segment_name)
        .map(str::to_string)
        .collect()
}

/// Template literal for `route_path` with each dynamic segment read from
/// `accessor_expr`: `/api/posts/[postId]` -> `` `/api/posts/${input.params.postId}` ``.
pub fn build_fetch_url_expression(route_path: &str, accessor_expr: &str) -> String {
    let path = route_path
        .split('/')
        .map(|segment| match dynamic_segment_name(segment) {
            Some(name) => format!("${{{}.{}}}", accessor_expr, name),
            None => segment.to_string(),
        })
        .collect::<Vec<_>>()
        .join("/");
    format!("`{}`", path)
}

/// HTML input type for a validator base type.
pub fn zod_type_to_input_type(zod_type: &ZodType) -> &'static str {
    match zod_type {
        ZodType::String => "text",
        ZodType::Number => "number",
        ZodType::Boolean => "checkbox",
        ZodType::Other(_) => "text",
    }
}

/// TypeScript type for a validator base type.
pub fn zod_type_to_ts_type(zod_type: &ZodType) -> &'static str {
    match zod_type {
        ZodType::String => "string",
        ZodType::Number => "number",
        ZodType::Boolean => "boolean",
        ZodType::Other(token) => match token.as_str() {
            "bigint" => "bigint",
            "date" => "Date",
            "array" => "unknown[]",
            _ => "unknown",
        },
    }
}

/// PascalCase name for a route built from its static segments.
///
/// A leading `api` segment is dropped: `/api/orgs/[orgId]/posts` -> `OrgsPosts`.
pub fn resource_name(route_path: &str) -> String {
    let statics: Vec<&str> = route_path
        .split('/')
        .filter(|segment| !segment.is_empty() && dynamic_segment_name(segment).is_none())
        .collect();
    let statics = match statics.split_first() {
        Some((&"api", rest)) => rest,
        _ => &statics[..],
    };

    let name: String = statics.iter().map(|segment| pascal_case(segment)).collect();
    let name: String = name.chars().filter(|c| c.is_alphanumeric()).collect();
    if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
        format!("Root{}", name)
    } else {
        name
    }
}
