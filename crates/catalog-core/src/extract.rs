//! Turn a parsed OpenAPI document into `Operation` and `Schema` rows.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::model::{Operation, Schema, HTTP_METHODS};

/// Walk `spec.paths`, producing one `Operation` per declared HTTP method,
/// with path-level and operation-level parameters merged. Operations are
/// returned sorted by `(path, method, operationId)`.
pub fn extract_operations(spec_id: &str, spec: &Value) -> Vec<Operation> {
    let Some(paths) = spec.get("paths").and_then(Value::as_object) else {
        return Vec::new();
    };

    let mut operations = Vec::new();
    let mut sorted_paths: Vec<(&String, &Value)> = paths.iter().collect();
    sorted_paths.sort_by(|a, b| a.0.cmp(b.0));

    for (path, path_item) in sorted_paths {
        let Some(path_item_obj) = path_item.as_object() else {
            continue;
        };
        let path_parameters = path_item_obj.get("parameters");

        for method in HTTP_METHODS {
            let Some(operation) = path_item_obj.get(method) else {
                continue;
            };
            let Some(operation_obj) = operation.as_object() else {
                continue;
            };

            let merged_parameters = merge_parameters(path_parameters, operation_obj.get("parameters"));
            let mut operation_payload = operation.clone();
            if !merged_parameters.is_empty() {
                operation_payload["parameters"] = Value::Array(merged_parameters);
            }

            let operation_id = operation_obj
                .get("operationId")
                .and_then(Value::as_str)
                .map(str::to_string);
            let summary = operation_obj
                .get("summary")
                .and_then(Value::as_str)
                .map(str::to_string);
            let description = operation_obj
                .get("description")
                .and_then(Value::as_str)
                .map(str::to_string);
            let mut tags: Vec<String> = operation_obj
                .get("tags")
                .and_then(Value::as_array)
                .map(|tags| {
                    tags.iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default();
            tags.sort();

            operations.push(Operation {
                spec_id: spec_id.to_string(),
                operation_id,
                method: method.to_string(),
                path: path.clone(),
                summary,
                description,
                tags,
                operation: operation_payload,
            });
        }
    }

    operations.sort_by(|a, b| {
        (
            &a.path,
            &a.method,
            a.operation_id.as_deref().unwrap_or(""),
        )
            .cmp(&(&b.path, &b.method, b.operation_id.as_deref().unwrap_or("")))
    });
    operations
}

/// Walk `spec.components.schemas`, producing one `Schema` per entry, sorted
/// by name.
pub fn extract_schemas(spec_id: &str, spec: &Value) -> Vec<Schema> {
    let Some(schemas_block) = spec
        .get("components")
        .and_then(Value::as_object)
        .and_then(|c| c.get("schemas"))
        .and_then(Value::as_object)
    else {
        return Vec::new();
    };

    let mut sorted: Vec<(&String, &Value)> = schemas_block.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    sorted
        .into_iter()
        .filter(|(_, schema)| schema.is_object())
        .map(|(name, schema)| Schema {
            spec_id: spec_id.to_string(),
            schema_name: name.clone(),
            description: schema
                .get("description")
                .and_then(Value::as_str)
                .map(str::to_string),
            schema: schema.clone(),
        })
        .collect()
}

/// Merge path-level and operation-level parameter lists, keyed by
/// `(name, in)`, with the operation-level entry taking precedence. The
/// result is sorted by `(in, name)`, matching the reference implementation.
pub fn merge_parameters(path_params: Option<&Value>, op_params: Option<&Value>) -> Vec<Value> {
    let mut merged: BTreeMap<(String, String), Value> = BTreeMap::new();

    let mut ingest = |params: Option<&Value>| {
        let Some(list) = params.and_then(Value::as_array) else {
            return;
        };
        for param in list {
            let Some(obj) = param.as_object() else {
                continue;
            };
            let (Some(name), Some(location)) = (
                obj.get("name").and_then(Value::as_str),
                obj.get("in").and_then(Value::as_str),
            ) else {
                continue;
            };
            merged.insert((location.to_string(), name.to_string()), param.clone());
        }
    };

    ingest(path_params);
    ingest(op_params);

    merged.into_values().collect()
}
