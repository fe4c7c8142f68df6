//! Core data model: specs, operations, schemas, and their stable identifiers.

use serde_json::{Map, Value};

/// Fixed-order list of HTTP methods recognized as operations in a path item.
pub const HTTP_METHODS: [&str; 8] = [
    "get", "post", "put", "patch", "delete", "options", "head", "trace",
];

/// One discovered spec file on disk, before parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecFingerprint {
    pub path: String,
    pub relative_path: String,
    pub size: u64,
    pub mtime: i64,
}

/// A spec file after raw JSON/YAML parsing and `spec_id` assignment.
#[derive(Debug, Clone)]
pub struct SpecFile {
    pub path: String,
    pub relative_path: String,
    pub raw: Value,
    pub spec_id: String,
}

/// Catalog-level metadata about one ingested spec.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecMeta {
    pub spec_id: String,
    pub title: Option<String>,
    pub version: Option<String>,
    pub description: Option<String>,
    pub file_path: String,
    pub operation_count: usize,
    pub schema_count: usize,
    pub is_valid: bool,
    pub validation_error: Option<String>,
}

/// One operation (method + path) extracted from a spec's `paths` object.
#[derive(Debug, Clone)]
pub struct Operation {
    pub spec_id: String,
    pub operation_id: Option<String>,
    pub method: String,
    pub path: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub operation: Value,
}

impl Operation {
    /// Stable identifier: `{spec_id}:{operationId}` when one is declared,
    /// else `{spec_id}:{method}:{path}`.
    pub fn op_key(&self) -> String {
        match &self.operation_id {
            Some(id) if !id.is_empty() => format!("{}:{}", self.spec_id, id),
            _ => format!("{}:{}:{}", self.spec_id, self.method, self.path),
        }
    }
}

/// One named schema extracted from a spec's `components.schemas`.
#[derive(Debug, Clone)]
pub struct Schema {
    pub spec_id: String,
    pub schema_name: String,
    pub description: Option<String>,
    pub schema: Value,
}

impl Schema {
    /// Stable identifier: `{spec_id}:{schema_name}`.
    pub fn schema_key(&self) -> String {
        format!("{}:{}", self.spec_id, self.schema_name)
    }
}

/// Recursively sort object keys so catalog output is byte-stable across runs.
pub fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut sorted = Map::new();
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            for key in keys {
                sorted.insert(key.clone(), canonicalize(&map[key]));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}
