//! JSON Schema validation of a request body against its operation's schema.

use jsonschema::Draft;
use serde_json::{Map, Value};

use crate::model::Operation;
use crate::payload::extract_request_body_schema;

/// One validation failure: an RFC 6901-ish pointer into the body plus a
/// human-readable message.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ValidationIssue {
    pub path: String,
    pub message: String,
}

/// The result of validating a request: `ok` is `true` iff `errors` is empty.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ValidationResult {
    pub ok: bool,
    pub errors: Vec<ValidationIssue>,
}

impl ValidationResult {
    fn passed() -> Self {
        Self { ok: true, errors: Vec::new() }
    }

    fn failed(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            ok: false,
            errors: vec![ValidationIssue { path: path.into(), message: message.into() }],
        }
    }

    /// The result returned by the engine when `endpointId` does not resolve
    /// to a known operation.
    pub fn unknown_endpoint() -> Self {
        Self::failed("", "Unknown endpointId")
    }
}

/// Validates `request`'s body against `record`'s request body schema.
/// `spec_version` is the operation's spec's `openapi` field value, used to
/// pick the JSON Schema dialect (2020-12 for 3.1 documents, draft-4-shaped
/// for 3.0 documents, matching the dialect each OpenAPI version embeds).
/// `request` may be either a full `build_payload`-style envelope
/// (`{"request": {"body": ...}}`), a bare `{"body": ...}`, or the body
/// itself.
pub fn validate_payload(
    record: &Operation,
    request: &Value,
    spec_version: Option<&str>,
    spec: Option<&Value>,
) -> ValidationResult {
    let Some(schema) = extract_request_body_schema(&record.operation, spec) else {
        return ValidationResult::passed();
    };
    if !schema.schema.is_object() {
        return ValidationResult::passed();
    }

    let body = extract_body(request);
    let Some(body) = body else {
        if schema.required {
            return ValidationResult::failed("body", "Request body is required");
        }
        return ValidationResult::passed();
    };

    let draft = if is_oas31(spec_version) { Draft::Draft202012 } else { Draft::Draft4 };
    let sanitized = sanitize_for_validation(&schema.schema);

    let validator = match jsonschema::options().with_draft(draft).build(&sanitized) {
        Ok(validator) => validator,
        Err(err) => return ValidationResult::failed("", format!("invalid schema: {err}")),
    };

    let mut errors: Vec<ValidationIssue> = validator
        .iter_errors(&body)
        .map(|error| ValidationIssue {
            path: format_error_path(&error.instance_path.to_string()),
            message: error.to_string(),
        })
        .collect();
    errors.sort_by(|a, b| (&a.path, &a.message).cmp(&(&b.path, &b.message)));

    ValidationResult { ok: errors.is_empty(), errors }
}

fn extract_body(request: &Value) -> Option<Value> {
    if let Some(inner) = request.get("request").filter(|v| v.is_object()) {
        return Some(inner.get("body").cloned().unwrap_or(Value::Null)).filter(|v| !v.is_null());
    }
    if let Some(obj) = request.as_object() {
        if obj.contains_key("body") {
            return obj.get("body").cloned().filter(|v| !v.is_null());
        }
    }
    Some(request.clone()).filter(|v| !v.is_null())
}

fn is_oas31(version: Option<&str>) -> bool {
    version.map(|v| v.starts_with("3.1")).unwrap_or(false)
}

/// Validate a parsed spec document structurally against the OpenAPI schema
/// shape. Used at ingest time to decide whether a spec contributes
/// operations/schemas to the catalog or is kept as an `is_valid=false`
/// entry with a message.
pub fn validate_spec_document(raw: &Value) -> (bool, Option<String>) {
    match serde_json::from_value::<openapiv3::OpenAPI>(raw.clone()) {
        Ok(_) => (true, None),
        Err(err) => (false, Some(err.to_string())),
    }
}

/// `jsonschema`'s pointer rendering is already `/a/b`-shaped; this just
/// normalizes the empty-path case to `""` the way the reference
/// implementation does.
fn format_error_path(pointer: &str) -> String {
    if pointer.is_empty() || pointer == "/" {
        String::new()
    } else {
        pointer.to_string()
    }
}

/// `discriminator` is an OpenAPI-only keyword that general JSON Schema
/// validators don't understand; strip it out before validating.
fn sanitize_for_validation(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut sanitized = Map::new();
            for (key, val) in map {
                if key == "discriminator" {
                    continue;
                }
                sanitized.insert(key.clone(), sanitize_for_validation(val));
            }
            Value::Object(sanitized)
        }
        Value::Array(items) => Value::Array(items.iter().map(sanitize_for_validation).collect()),
        other => other.clone(),
    }
}
