//! Core data model shared by every pipeline stage.
//!
//! Scanner output ([`ConfigFileRef`], [`ConfigGroup`]) feeds the parser,
//! parser output ([`RouteDescriptor`]) feeds the generators, and generator
//! output ([`GeneratedFile`]) is written by the orchestrator.

use serde::{Serialize, Serializer};
use std::fmt;
use std::path::PathBuf;

/// HTTP method encoded in a descriptor file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    /// Every recognized method.
    pub const ALL: [HttpMethod; 5] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Patch,
        HttpMethod::Delete,
    ];

    /// Parse a lower-case method token (`get`, `post`, ...).
    pub fn parse(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.as_str() == token)
    }

    /// Lower-case token as it appears in descriptor file names.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Patch => "patch",
            HttpMethod::Delete => "delete",
        }
    }

    /// Upper-case name used for route exports and fetch calls.
    pub fn as_upper(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// Whether the method reads data (auto-fetching hook) rather than mutating it.
    pub fn is_query(&self) -> bool {
        matches!(self, HttpMethod::Get)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One discovered descriptor file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFileRef {
    /// Containing directory, relative to the scan root.
    pub directory: PathBuf,
    pub method: HttpMethod,
    /// Base name of the descriptor file (`route.get.config.ts`).
    pub config_file_name: String,
    pub absolute_path: PathBuf,
}

/// Descriptor files sharing one directory, ordered by method token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigGroup {
    pub directory: PathBuf,
    pub configs: Vec<ConfigFileRef>,
}

/// Base type of a validator field, taken from its leading `z.<type>(` call.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ZodType {
    String,
    Number,
    Boolean,
    Other(String),
}

impl ZodType {
    pub fn from_token(token: &str) -> Self {
        match token {
            "string" => ZodType::String,
            "number" => ZodType::Number,
            "boolean" => ZodType::Boolean,
            other => ZodType::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ZodType::String => "string",
            ZodType::Number => "number",
            ZodType::Boolean => "boolean",
            ZodType::Other(token) => token,
        }
    }
}

impl fmt::Display for ZodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ZodType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A top-level property of a `z.object({ ... })` literal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    pub name: String,
    pub zod_type: ZodType,
    /// `.optional()` or `.nullish()` appears in the field's call chain.
    pub optional: bool,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, zod_type: ZodType) -> Self {
        Self {
            name: name.into(),
            zod_type,
            optional: false,
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

/// Structural facts extracted from one descriptor file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteDescriptor {
    pub method: HttpMethod,
    pub config_file_name: String,
    pub has_body: bool,
    pub has_params: bool,
    pub has_search_params: bool,
    pub has_headers: bool,
    pub has_auth: bool,
    pub body_fields: Vec<FieldDescriptor>,
    pub param_fields: Vec<FieldDescriptor>,
    pub search_param_fields: Vec<FieldDescriptor>,
    pub header_fields: Vec<FieldDescriptor>,
}

impl RouteDescriptor {
    /// Descriptor with no declared facets.
    pub fn empty(method: HttpMethod, config_file_name: impl Into<String>) -> Self {
        Self {
            method,
            config_file_name: config_file_name.into(),
            has_body: false,
            has_params: false,
            has_search_params: false,
            has_headers: false,
            has_auth: false,
            body_fields: Vec::new(),
            param_fields: Vec::new(),
            search_param_fields: Vec::new(),
            header_fields: Vec::new(),
        }
    }

    /// Module specifier of the descriptor as seen from the output directory.
    pub fn module_specifier(&self) -> String {
        let stem = match self.config_file_name.rfind('.') {
            Some(idx) if idx > 0 => &self.config_file_name[..idx],
            _ => self.config_file_name.as_str(),
        };
        format!("../{}", stem)
    }
}

/// One output artifact produced by a generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub file_name: String,
    pub content: String,
}

impl GeneratedFile {
    pub fn new(file_name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            content: content.into(),
        }
    }
}

/// Files written for one route directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedDirectory {
    pub directory: PathBuf,
    pub files: Vec<String>,
}

/// Terminal value of one end-to-end run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated: Option<Vec<GeneratedDirectory>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GenerationResult {
    pub fn success(generated: Vec<GeneratedDirectory>) -> Self {
        Self {
            success: true,
            generated: Some(generated),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            generated: None,
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_parse_round_trips_tokens() {
        for method in HttpMethod::ALL {
            assert_eq!(HttpMethod::parse(method.as_str()), Some(method));
        }
        assert_eq!(HttpMethod::parse("GET"), None);
        assert_eq!(HttpMethod::parse("options"), None);
    }

    #[test]
    fn test_module_specifier_strips_extension() {
        let descriptor = RouteDescriptor::empty(HttpMethod::Post, "route.post.config.ts");
        assert_eq!(descriptor.module_specifier(), "../route.post.config");
    }

    #[test]
    fn test_result_serializes_without_absent_fields() {
        let json = serde_json::to_value(GenerationResult::failure("boom")).unwrap();
        assert_eq!(json, serde_json::json!({ "success": false, "error": "boom" }));
    }
}
