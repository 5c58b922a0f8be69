//! Schema extraction from descriptor source text.
//!
//! Descriptor files are TypeScript modules, but only a sliver of their
//! structure matters here: which keys the `requestValidator` builder call
//! receives, and the top-level properties of the `z.object({ ... })` literals
//! those keys point at. This module reads that structure with anchored
//! regexes, matched against a copy with comments and literals blanked out,
//! plus a bracket-balanced walk that skips those same literals and comments.
//! Anything it cannot resolve becomes an empty field list.

use crate::types::{FieldDescriptor, HttpMethod, RouteDescriptor, ZodType};
use regex::Regex;

/// Name of the export carrying the request-validator builder call.
pub const REQUEST_VALIDATOR_EXPORT: &str = "requestValidator";

// =============================================================================
// Bracket-balanced walking
// =============================================================================

/// Offset just past the string literal, comment or regex literal starting at `i`.
fn skip_trivia(bytes: &[u8], i: usize) -> Option<usize> {
    match bytes[i] {
        quote @ (b'"' | b'\'' | b'`') => {
            let mut j = i + 1;
            while j < bytes.len() {
                match bytes[j] {
                    b'\\' => j += 2,
                    b if b == quote => return Some(j + 1),
                    _ => j += 1,
                }
            }
            Some(bytes.len())
        }
        b'/' if bytes.get(i + 1) == Some(&b'/') => Some(
            bytes[i..]
                .iter()
                .position(|&b| b == b'\n')
                .map_or(bytes.len(), |p| i + p),
        ),
        b'/' if bytes.get(i + 1) == Some(&b'*') => Some(
            bytes[i + 2..]
                .windows(2)
                .position(|w| w == b"*/")
                .map_or(bytes.len(), |p| i + 2 + p + 2),
        ),
        b'/' if starts_regex_literal(bytes, i) => skip_regex_literal(bytes, i),
        _ => None,
    }
}

/// A `/` opens a regex literal, not a division, after an operator or opening
/// bracket.
fn starts_regex_literal(bytes: &[u8], i: usize) -> bool {
    match bytes[..i].iter().rev().find(|b| !b.is_ascii_whitespace()) {
        None => true,
        Some(prev) => b"(,=:[!&|?{};".contains(prev),
    }
}

/// Offset past the flags of the regex literal opened at `i`. A line break
/// before the closing slash means it was not a regex literal after all.
fn skip_regex_literal(bytes: &[u8], i: usize) -> Option<usize> {
    let mut in_class = false;
    let mut j = i + 1;

    while j < bytes.len() {
        match bytes[j] {
            b'\\' => j += 2,
            b'\n' => return None,
            b'[' => {
                in_class = true;
                j += 1;
            }
            b']' => {
                in_class = false;
                j += 1;
            }
            b'/' if !in_class => {
                j += 1;
                while j < bytes.len() && bytes[j].is_ascii_alphabetic() {
                    j += 1;
                }
                return Some(j);
            }
            _ => j += 1,
        }
    }

    None
}

/// Copy of `source` with every comment, string and regex literal blanked to
/// spaces. Byte offsets line up with `source`, so anchored patterns can match
/// here and the bracket walk can continue on the original text.
fn mask_trivia(source: &str) -> String {
    let bytes = source.as_bytes();
    let mut masked = bytes.to_vec();
    let mut i = 0;

    while i < bytes.len() {
        match skip_trivia(bytes, i) {
            Some(next) => {
                let end = next.min(bytes.len());
                for byte in &mut masked[i..end] {
                    if *byte != b'\n' {
                        *byte = b' ';
                    }
                }
                i = end;
            }
            None => i += 1,
        }
    }

    String::from_utf8(masked).unwrap_or_else(|_| source.to_string())
}

/// Index of the bracket closing the one at `open`.
fn find_matching(text: &str, open: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut i = open;

    while i < bytes.len() {
        if let Some(next) = skip_trivia(bytes, i) {
            i = next;
            continue;
        }
        match bytes[i] {
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
        i += 1;
    }

    None
}

/// Split `text` on `separator` wherever it appears outside any bracket pair.
fn split_top_level(text: &str, separator: u8) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if let Some(next) = skip_trivia(bytes, i) {
            i = next;
            continue;
        }
        match bytes[i] {
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => depth -= 1,
            b if b == separator && depth == 0 => {
                parts.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    parts.push(&text[start..]);

    parts
}

/// Drop leading whitespace and comments.
fn strip_leading_trivia(mut text: &str) -> &str {
    loop {
        text = text.trim_start();
        if text.starts_with("//") || text.starts_with("/*") {
            match skip_trivia(text.as_bytes(), 0) {
                Some(end) => text = &text[end..],
                None => return text,
            }
        } else {
            return text;
        }
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Leading identifier of `text`, if it starts with one.
fn leading_identifier(text: &str) -> Option<&str> {
    let end = text.find(|c: char| !is_ident_char(c)).unwrap_or(text.len());
    let ident = &text[..end];
    if ident.is_empty() || ident.starts_with(|c: char| c.is_ascii_digit()) {
        None
    } else {
        Some(ident)
    }
}

// =============================================================================
// Object literals
// =============================================================================

/// One `key: value` pair at the top level of an object literal body.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ObjectEntry<'a> {
    key: &'a str,
    /// Value expression; equals `key` for shorthand properties.
    value: &'a str,
}

/// Top-level entries of an object literal body (the text between braces).
///
/// Spreads and computed keys are skipped.
fn object_entries(body: &str) -> Vec<ObjectEntry<'_>> {
    let mut entries = Vec::new();

    for part in split_top_level(body, b',') {
        let part = strip_leading_trivia(part).trim_end();
        if part.is_empty() || part.starts_with("...") {
            continue;
        }

        let (key, rest) = match part.chars().next() {
            Some(quote @ ('"' | '\'')) => match part[1..].find(quote) {
                Some(end) => (&part[1..1 + end], &part[end + 2..]),
                None => continue,
            },
            _ => {
                let part = strip_method_modifier(part);
                match leading_identifier(part) {
                    Some(ident) => (ident, &part[ident.len()..]),
                    None => continue,
                }
            }
        };

        let rest = rest.trim_start();
        let value = if let Some(value) = rest.strip_prefix(':') {
            value.trim()
        } else if rest.is_empty() {
            key
        } else if rest.starts_with('(') {
            // method shorthand: `user(req) { ... }`
            rest
        } else {
            continue;
        };

        entries.push(ObjectEntry { key, value });
    }

    entries
}

/// Drop an `async`, `get` or `set` modifier in front of a method key.
fn strip_method_modifier(part: &str) -> &str {
    for modifier in ["async", "get", "set"] {
        if let Some(rest) = part.strip_prefix(modifier) {
            let key = rest.trim_start();
            if rest.len() > key.len() && key.starts_with(is_ident_char) {
                return key;
            }
        }
    }
    part
}

/// Names of the calls chained after a base expression: `.min(1).email()` -> `[min, email]`.
fn chained_calls(mut rest: &str) -> Vec<&str> {
    let mut calls = Vec::new();

    while let Some(after_dot) = strip_leading_trivia(rest).strip_prefix('.') {
        let after_dot = after_dot.trim_start();
        let Some(name) = leading_identifier(after_dot) else {
            break;
        };
        calls.push(name);

        let tail = after_dot[name.len()..].trim_start();
        rest = if tail.starts_with('(') {
            match find_matching(tail, 0) {
                Some(close) => &tail[close + 1..],
                None => break,
            }
        } else {
            tail
        };
    }

    calls
}

fn zod_base_call() -> Option<Regex> {
    Regex::new(r"^z\s*\.\s*(?:coerce\s*\.\s*)?([A-Za-z_$][\w$]*)").ok()
}

/// Build a field from one property of a validator object literal.
fn field_from_entry(base_call: Option<&Regex>, entry: &ObjectEntry<'_>) -> FieldDescriptor {
    let captures = base_call.and_then(|re| re.captures(entry.value));
    let Some((matched, token)) = captures.and_then(|c| Some((c.get(0)?, c.get(1)?))) else {
        return FieldDescriptor::new(entry.key, ZodType::Other("unknown".to_string()));
    };

    let mut field = FieldDescriptor::new(entry.key, ZodType::from_token(token.as_str()));

    let after = entry.value[matched.end()..].trim_start();
    if after.starts_with('(') {
        if let Some(close) = find_matching(after, 0) {
            field.optional = chained_calls(&after[close + 1..])
                .iter()
                .any(|call| matches!(*call, "optional" | "nullish"));
        }
    }

    field
}

/// Body of the first `const <name> = <prefix>{ ... }` in `source`.
fn assigned_object_body<'a>(source: &'a str, name: &str, prefix: &str) -> Option<&'a str> {
    let pattern = format!(
        r"\b(?:const|let|var)\s+{}\s*(?::[^=]*)?=\s*{}\{{",
        regex::escape(name),
        prefix
    );
    let re = Regex::new(&pattern).ok()?;
    let masked = mask_trivia(source);
    let found = re.find(&masked)?;
    let open = found.end() - 1;
    let close = find_matching(source, open)?;
    Some(&source[open + 1..close])
}

/// Fields of the `z.object({ ... })` literal assigned to `variable_name`.
///
/// Order follows the source. Nested objects are not expanded and chained
/// qualifiers never produce fields of their own. An unknown variable, or
/// one not assigned a `z.object` literal, yields an empty list.
pub fn extract_zod_object_fields(source: &str, variable_name: &str) -> Vec<FieldDescriptor> {
    let Some(body) = assigned_object_body(source, variable_name, r"z\s*\.\s*object\s*\(\s*")
    else {
        return Vec::new();
    };

    let base_call = zod_base_call();
    object_entries(body)
        .iter()
        .map(|entry| field_from_entry(base_call.as_ref(), entry))
        .collect()
}

// =============================================================================
// Descriptor files
// =============================================================================

/// Body of the object literal passed to the request-validator builder call.
///
/// `Some("")` when the call has no object argument.
fn request_validator_argument(source: &str) -> Option<&str> {
    let pattern = format!(
        r"\b{}\s*(?::[^=]*)?=",
        regex::escape(REQUEST_VALIDATOR_EXPORT)
    );
    let re = Regex::new(&pattern).ok()?;
    let masked = mask_trivia(source);
    let found = re.find(&masked)?;

    let rest = &source[found.end()..];
    let masked_rest = &masked[found.end()..];
    let paren = masked_rest.find('(')?;
    if masked_rest[..paren].contains(';') {
        return None;
    }
    let close = find_matching(rest, paren)?;
    let argument = strip_leading_trivia(&rest[paren + 1..close]);

    if argument.starts_with('{') {
        let end = find_matching(argument, 0)?;
        return Some(&argument[1..end]);
    }

    // `builder(shape)` with `const shape = { ... }` in the same file
    match leading_identifier(argument) {
        Some(ident) => Some(assigned_object_body(source, ident, "").unwrap_or("")),
        None => Some(""),
    }
}

/// Fields behind a facet value that references a same-file variable.
fn facet_fields(source: &str, value: &str) -> Vec<FieldDescriptor> {
    match leading_identifier(value) {
        Some(ident) if ident != "z" => extract_zod_object_fields(source, ident),
        _ => Vec::new(),
    }
}

/// Parse one descriptor file into a [`RouteDescriptor`].
///
/// Each facet flag reflects only whether its key is present; field lists are
/// resolved separately and may be empty for declared facets (inline or
/// unresolvable validators). `user` marks authentication and is never
/// expanded into fields.
pub fn parse_config_file(source: &str, method: HttpMethod, config_file_name: &str) -> RouteDescriptor {
    let mut descriptor = RouteDescriptor::empty(method, config_file_name);

    let Some(argument) = request_validator_argument(source) else {
        tracing::warn!(
            file = config_file_name,
            "no {} builder call found; treating route as having no typed inputs",
            REQUEST_VALIDATOR_EXPORT
        );
        return descriptor;
    };

    for entry in object_entries(argument) {
        match entry.key {
            "body" => {
                descriptor.has_body = true;
                descriptor.body_fields = facet_fields(source, entry.value);
            }
            "params" => {
                descriptor.has_params = true;
                descriptor.param_fields = facet_fields(source, entry.value);
            }
            "searchParams" => {
                descriptor.has_search_params = true;
                descriptor.search_param_fields = facet_fields(source, entry.value);
            }
            "headers" => {
                descriptor.has_headers = true;
                descriptor.header_fields = facet_fields(source, entry.value);
            }
            "user" => descriptor.has_auth = true,
            _ => {}
        }
    }

    tracing::debug!(
        file = config_file_name,
        %method,
        has_body = descriptor.has_body,
        has_params = descriptor.has_params,
        has_search_params = descriptor.has_search_params,
        has_headers = descriptor.has_headers,
        has_auth = descriptor.has_auth,
        "parsed descriptor"
    );

    descriptor
}
