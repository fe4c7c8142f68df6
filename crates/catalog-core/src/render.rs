//! Canonical JSON rendering of operations, schemas, and endpoint contracts.
//!
//! Implemented once here, at the rendering boundary, rather than sprinkling
//! key-sorting calls through the engine: every function in this module
//! returns output whose mapping keys are already sorted ascending,
//! recursively.

use serde_json::Value;

use crate::index::{OperationRecord, SchemaRecord};
use crate::model::canonicalize;
use crate::resolve::deep_resolve_refs;

/// Render a full operation body (the merged, spec-shaped `operation`
/// mapping), canonicalized. Callers represent "not found" as an empty
/// mapping rather than calling this function.
pub fn render_operation(record: &OperationRecord) -> Value {
    canonicalize(&record.operation)
}

/// Render a full schema body, canonicalized.
pub fn render_schema(record: &SchemaRecord) -> Value {
    canonicalize(&record.schema)
}

/// Render an endpoint contract. `parameters` is always included; `requestBody`
/// and `responses` are included only when `full` is true, with local `$ref`s
/// resolved against `spec` (when available). When `full` is false both are
/// `null`.
pub fn render_contract(
    endpoint_id: &str,
    record: &OperationRecord,
    full: bool,
    spec: Option<&Value>,
) -> Value {
    let parameters = record
        .operation
        .get("parameters")
        .cloned()
        .unwrap_or_else(|| Value::Array(Vec::new()));

    let (request_body, responses) = if full {
        (
            record
                .operation
                .get("requestBody")
                .map(|v| resolve_against(v, spec))
                .unwrap_or(Value::Null),
            record
                .operation
                .get("responses")
                .map(|v| resolve_against(v, spec))
                .unwrap_or(Value::Null),
        )
    } else {
        (Value::Null, Value::Null)
    };

    canonicalize(&serde_json::json!({
        "endpointId": endpoint_id,
        "specId": record.spec_id,
        "operationId": record.operation_id,
        "method": record.method,
        "path": record.path,
        "summary": record.summary,
        "description": record.description,
        "tags": record.tags,
        "parameters": parameters,
        "requestBody": request_body,
        "responses": responses,
    }))
}

fn resolve_against(value: &Value, spec: Option<&Value>) -> Value {
    match spec {
        Some(spec) => deep_resolve_refs(value, spec),
        None => value.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(operation: Value) -> OperationRecord {
        OperationRecord {
            spec_id: "pets".into(),
            operation_id: Some("createPet".into()),
            method: "post".into(),
            path: "/pets".into(),
            summary: Some("Create a pet".into()),
            description: None,
            tags: vec!["pets".into()],
            operation,
        }
    }

    #[test]
    fn render_operation_sorts_keys_recursively() {
        let record = record(json!({"b": 1, "a": {"z": 1, "y": 2}}));
        let rendered = render_operation(&record);
        let keys: Vec<&String> = rendered.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn contract_omits_body_and_responses_unless_full() {
        let record = record(json!({
            "requestBody": {"content": {}},
            "responses": {"200": {}},
        }));
        let contract = render_contract("pets:createPet", &record, false, None);
        assert_eq!(contract["requestBody"], Value::Null);
        assert_eq!(contract["responses"], Value::Null);
    }

    #[test]
    fn contract_resolves_refs_when_full() {
        let spec = json!({"components": {"schemas": {"Pet": {"type": "object"}}}});
        let record = record(json!({
            "requestBody": {"content": {"application/json": {"schema": {"$ref": "#/components/schemas/Pet"}}}},
        }));
        let contract = render_contract("pets:createPet", &record, true, Some(&spec));
        let schema =
            &contract["requestBody"]["content"]["application/json"]["schema"];
        assert_eq!(schema, &json!({"type": "object"}));
    }

    #[test]
    fn contract_always_includes_parameters() {
        let record = record(json!({"parameters": [{"name": "id", "in": "path"}]}));
        let contract = render_contract("pets:createPet", &record, false, None);
        assert_eq!(contract["parameters"].as_array().unwrap().len(), 1);
    }
}
