//! Local `$ref` resolution (JSON Pointer, `#/...` only) with cycle tolerance.

use std::collections::HashSet;

use serde_json::Value;

/// Recursively resolve every local `$ref` in `value` against `spec`,
/// substituting the pointed-to value in place. External refs (anything not
/// starting with `#/`) and refs that fail to resolve are left untouched.
/// Refs still open in the current resolution chain resolve to an empty
/// object rather than recursing forever.
pub fn deep_resolve_refs(value: &Value, spec: &Value) -> Value {
    let mut seen = HashSet::new();
    resolve_inner(value, spec, &mut seen)
}

fn resolve_inner(value: &Value, spec: &Value, seen: &mut HashSet<String>) -> Value {
    match value {
        Value::Object(map) => {
            if let Some(Value::String(ref_str)) = map.get("$ref") {
                if seen.contains(ref_str) {
                    return Value::Object(Default::default());
                }
                return match resolve_ref_pointer(spec, ref_str) {
                    Some(target) => {
                        seen.insert(ref_str.clone());
                        let resolved = resolve_inner(&target, spec, seen);
                        seen.remove(ref_str);
                        resolved
                    }
                    None => value.clone(),
                };
            }
            let mut out = serde_json::Map::new();
            for (key, val) in map {
                out.insert(key.clone(), resolve_inner(val, spec, seen));
            }
            Value::Object(out)
        }
        Value::Array(items) => {
            Value::Array(items.iter().map(|item| resolve_inner(item, spec, seen)).collect())
        }
        other => other.clone(),
    }
}

/// Eagerly resolve every local `$ref` in an entire document against itself,
/// for `DerefMode::Full`. Equivalent in effect to the reference
/// implementation's `prance`-backed eager resolution, built on the same
/// pointer walk used for on-demand resolution.
pub fn dereference_document(raw: &Value) -> Value {
    deep_resolve_refs(raw, raw)
}

fn resolve_ref_pointer(spec: &Value, ref_str: &str) -> Option<Value> {
    if !ref_str.starts_with("#/") {
        return None;
    }
    let pointer = &ref_str[2..];
    if pointer.is_empty() {
        return Some(spec.clone());
    }
    let mut current = spec;
    for part in pointer.split('/') {
        let decoded = part.replace("~1", "/").replace("~0", "~");
        current = current.as_object()?.get(&decoded)?;
    }
    Some(current.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn resolves_simple_local_ref() {
        let spec = json!({
            "components": {"schemas": {"Pet": {"type": "object"}}}
        });
        let value = json!({"$ref": "#/components/schemas/Pet"});
        assert_eq!(deep_resolve_refs(&value, &spec), json!({"type": "object"}));
    }

    #[test]
    fn leaves_external_ref_untouched() {
        let spec = json!({});
        let value = json!({"$ref": "external.yaml#/Pet"});
        assert_eq!(deep_resolve_refs(&value, &spec), value);
    }

    #[test]
    fn leaves_unresolvable_ref_untouched() {
        let spec = json!({"components": {}});
        let value = json!({"$ref": "#/components/schemas/Missing"});
        assert_eq!(deep_resolve_refs(&value, &spec), value);
    }

    #[test]
    fn cyclical_ref_resolves_to_empty_object() {
        let spec = json!({
            "components": {"schemas": {"Node": {"$ref": "#/components/schemas/Node"}}}
        });
        let value = json!({"$ref": "#/components/schemas/Node"});
        assert_eq!(deep_resolve_refs(&value, &spec), json!({}));
    }

    #[test]
    fn decodes_tilde_escapes_in_pointer_segments() {
        let spec = json!({"a/b": {"c~d": "value"}});
        let value = json!({"$ref": "#/a~1b/c~0d"});
        assert_eq!(deep_resolve_refs(&value, &spec), json!("value"));
    }

    #[test]
    fn dereference_document_resolves_refs_against_itself() {
        let raw = json!({
            "components": {"schemas": {"Pet": {"type": "object"}}},
            "paths": {"/pets": {"get": {"responses": {"200": {"content": {"application/json": {"schema": {"$ref": "#/components/schemas/Pet"}}}}}}}}
        });
        let resolved = dereference_document(&raw);
        let schema =
            &resolved["paths"]["/pets"]["get"]["responses"]["200"]["content"]["application/json"]["schema"];
        assert_eq!(schema, &json!({"type": "object"}));
    }

    #[test]
    fn resolves_refs_nested_in_arrays() {
        let spec = json!({"components": {"schemas": {"Pet": {"type": "object"}}}});
        let value = json!([{"$ref": "#/components/schemas/Pet"}, {"type": "string"}]);
        assert_eq!(
            deep_resolve_refs(&value, &spec),
            json!([{"type": "object"}, {"type": "string"}])
        );
    }
}
