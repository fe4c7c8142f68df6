//! Schema-driven synthesis of example requests.
//!
//! Given an operation and a partial set of caller-provided fields, builds a
//! complete request (path/query/header parameters plus a JSON body) by
//! walking the operation's JSON Schema and filling in anything missing with
//! a deterministic guess. Every field that had to be guessed because it was
//! required but not supplied is reported back in `unknownRequiredFields` so
//! a caller knows what it should really provide.

use std::collections::{BTreeSet, HashSet};

use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::model::Operation;
use crate::resolve::deep_resolve_refs;

/// Recursion is capped the same way the reference catalog caps it: past this
/// many nested levels a schema is assumed to be self-referential and the
/// walk bottoms out at a sentinel instead of looping forever.
const MAX_DEPTH: u32 = 3;

#[derive(Debug, Clone)]
struct Discriminator {
    name: String,
    value: Value,
}

struct NormalizedProvided {
    path: Value,
    query: Value,
    header: Value,
    body: Value,
}

pub(crate) struct RequestBodyInfo {
    pub(crate) required: bool,
    pub(crate) content_type: String,
    pub(crate) schema: Value,
}

/// Build a synthetic request for `record`, filling in any field not present
/// in `provided_fields` with a deterministic placeholder. `spec` is used to
/// resolve `$ref`s in the request body schema; pass `None` if the operation
/// is already fully dereferenced.
pub fn build_payload(
    endpoint_id: &str,
    record: &Operation,
    provided_fields: &Value,
    spec: Option<&Value>,
) -> Value {
    let parameters = record
        .operation
        .get("parameters")
        .cloned()
        .unwrap_or_else(|| Value::Array(vec![]));
    let provided = normalize_provided_fields(provided_fields);

    let request_body = extract_request_body_schema(&record.operation, spec);
    let content_type = request_body.as_ref().map(|rb| rb.content_type.clone());
    let body_required = request_body.as_ref().map(|rb| rb.required).unwrap_or(false);
    let body_schema = request_body.map(|rb| rb.schema).filter(Value::is_object);

    let (param_payload, param_unknowns) = build_parameters(&parameters, &provided);
    let (body_payload, body_unknowns) = build_body(body_schema.as_ref(), &provided.body);

    let mut unknowns: BTreeSet<String> = param_unknowns.into_iter().collect();
    unknowns.extend(body_unknowns);

    let body_is_empty = match &body_payload {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    };
    if body_required && body_is_empty {
        unknowns.insert("body".to_string());
    }

    serde_json::json!({
        "endpointId": endpoint_id,
        "request": {
            "method": record.method,
            "path": record.path,
            "contentType": content_type,
            "parameters": param_payload,
            "body": body_payload,
        },
        "unknownRequiredFields": unknowns.into_iter().collect::<Vec<_>>(),
    })
}

/// Accepts either the flat `{path, query, header, body}` shape, a
/// `{parameters: {...}, body}` shape, or (if neither key is present at all)
/// treats the whole value as the request body.
fn normalize_provided_fields(provided_fields: &Value) -> NormalizedProvided {
    const KNOWN_KEYS: [&str; 5] = ["path", "query", "header", "body", "parameters"];
    let empty_object = || Value::Object(Map::new());

    let Some(obj) = provided_fields.as_object() else {
        return NormalizedProvided {
            path: empty_object(),
            query: empty_object(),
            header: empty_object(),
            body: provided_fields.clone(),
        };
    };
    if !KNOWN_KEYS.iter().any(|k| obj.contains_key(*k)) {
        return NormalizedProvided {
            path: empty_object(),
            query: empty_object(),
            header: empty_object(),
            body: provided_fields.clone(),
        };
    }

    if let Some(parameters) = obj.get("parameters").and_then(Value::as_object) {
        return NormalizedProvided {
            path: parameters
                .get("path")
                .cloned()
                .or_else(|| obj.get("path").cloned())
                .unwrap_or_else(empty_object),
            query: parameters
                .get("query")
                .cloned()
                .or_else(|| obj.get("query").cloned())
                .unwrap_or_else(empty_object),
            header: parameters
                .get("header")
                .cloned()
                .or_else(|| obj.get("header").cloned())
                .unwrap_or_else(empty_object),
            body: obj.get("body").cloned().unwrap_or_else(empty_object),
        };
    }

    NormalizedProvided {
        path: obj.get("path").cloned().unwrap_or_else(empty_object),
        query: obj.get("query").cloned().unwrap_or_else(empty_object),
        header: obj.get("header").cloned().unwrap_or_else(empty_object),
        body: obj.get("body").cloned().unwrap_or_else(empty_object),
    }
}

/// Picks the request body's media type (`application/json` if present, else
/// the lexicographically first content type) and deep-resolves its schema.
/// Returns `None` only when the operation has no request body content at
/// all; a present-but-non-object schema is reported with `schema: null`
/// rather than treated as absent (callers decide what that means).
pub(crate) fn extract_request_body_schema(
    operation: &Value,
    spec: Option<&Value>,
) -> Option<RequestBodyInfo> {
    let request_body = operation.get("requestBody")?.as_object()?;
    let content = request_body.get("content")?.as_object()?;
    if content.is_empty() {
        return None;
    }

    let content_type = if content.contains_key("application/json") {
        "application/json".to_string()
    } else {
        let mut keys: Vec<&String> = content.keys().collect();
        keys.sort();
        keys[0].clone()
    };

    let schema = content
        .get(&content_type)
        .and_then(|media| media.get("schema"))
        .filter(|s| s.is_object())
        .map(|s| match spec {
            Some(sp) => deep_resolve_refs(s, sp),
            None => s.clone(),
        })
        .unwrap_or(Value::Null);

    Some(RequestBodyInfo {
        required: request_body.get("required").and_then(Value::as_bool).unwrap_or(false),
        content_type,
        schema,
    })
}

/// Buckets `path`/`query`/`header` parameters, using the provided value when
/// present and a guessed placeholder (recorded as unknown) otherwise. Params
/// that are neither required nor supplied are left out entirely.
fn build_parameters(parameters: &Value, provided: &NormalizedProvided) -> (Value, Vec<String>) {
    let mut buckets = Map::new();
    buckets.insert("path".to_string(), Value::Object(Map::new()));
    buckets.insert("query".to_string(), Value::Object(Map::new()));
    buckets.insert("header".to_string(), Value::Object(Map::new()));
    let mut unknowns = Vec::new();

    let Some(params) = parameters.as_array() else {
        return (Value::Object(buckets), unknowns);
    };

    for param in params {
        let Some(obj) = param.as_object() else { continue };
        let Some(name) = obj.get("name").and_then(Value::as_str) else { continue };
        let Some(location) = obj.get("in").and_then(Value::as_str) else { continue };
        if !matches!(location, "path" | "query" | "header") {
            continue;
        }

        let required = obj.get("required").and_then(Value::as_bool).unwrap_or(false);
        let provided_bucket = match location {
            "path" => &provided.path,
            "query" => &provided.query,
            _ => &provided.header,
        };
        let provided_value = provided_bucket
            .as_object()
            .and_then(|o| o.get(name))
            .filter(|v| !v.is_null());

        if !required && provided_value.is_none() {
            continue;
        }

        let bucket = buckets
            .get_mut(location)
            .and_then(Value::as_object_mut)
            .expect("path/query/header buckets are always pre-seeded");

        if let Some(value) = provided_value {
            bucket.insert(name.to_string(), value.clone());
        } else {
            let schema = obj.get("schema").unwrap_or(&Value::Null);
            bucket.insert(name.to_string(), placeholder_for_schema(schema, Some(name)));
            unknowns.push(format!("params.{location}.{name}"));
        }
    }

    (Value::Object(buckets), unknowns)
}

/// Generates the request body from `schema`, or `null` if the operation has
/// no request body at all.
fn build_body(schema: Option<&Value>, provided_body: &Value) -> (Value, Vec<String>) {
    let mut unknowns = Vec::new();
    let Some(schema) = schema else {
        return (Value::Null, unknowns);
    };
    let provided = if provided_body.is_null() { None } else { Some(provided_body) };
    let value = generate_from_schema(schema, provided, "body", &mut unknowns, 0, Some("body"));
    (value, unknowns)
}

/// The core recursive generator. `provided`, when present, is threaded
/// through and takes precedence over generated values at every matching
/// level; any required property still missing after that is appended to
/// `unknowns` as a dotted/bracketed path.
fn generate_from_schema(
    schema: &Value,
    provided: Option<&Value>,
    path: &str,
    unknowns: &mut Vec<String>,
    depth: u32,
    field_name: Option<&str>,
) -> Value {
    if depth > MAX_DEPTH {
        return Value::String("<recursion_limit>".to_string());
    }

    let (selected, discriminator) = select_union_schema(schema, provided);
    let schema = normalize_schema(&selected);
    let schema_type = schema.get("type").and_then(Value::as_str);

    if let Some(p) = provided.filter(|v| !v.is_null()) {
        if p.is_object() && schema_type == Some("object") {
            return generate_object(&schema, p, path, unknowns, discriminator.as_ref(), depth);
        }
        if let Some(items) = p.as_array() {
            if schema_type == Some("array") {
                let item_schema = schema
                    .get("items")
                    .filter(|s| s.is_object())
                    .cloned()
                    .unwrap_or_else(|| Value::Object(Map::new()));
                let values: Vec<Value> = items
                    .iter()
                    .enumerate()
                    .map(|(idx, item)| {
                        generate_from_schema(
                            &item_schema,
                            Some(item),
                            &format!("{path}[{idx}]"),
                            unknowns,
                            depth + 1,
                            field_name,
                        )
                    })
                    .collect();
                return Value::Array(values);
            }
        }
        return p.clone();
    }

    if let Some(const_value) = schema.get("const") {
        return const_value.clone();
    }
    if let Some(default_value) = schema.get("default") {
        return default_value.clone();
    }
    if let Some(first) = schema.get("enum").and_then(Value::as_array).and_then(|e| e.first()) {
        return first.clone();
    }

    match schema_type {
        Some("object") => {
            generate_object(&schema, &Value::Object(Map::new()), path, unknowns, discriminator.as_ref(), depth)
        }
        Some("array") => {
            let item_schema = schema
                .get("items")
                .filter(|s| s.is_object())
                .cloned()
                .unwrap_or_else(|| Value::Object(Map::new()));
            let item = generate_from_schema(
                &item_schema,
                None,
                &format!("{path}[0]"),
                unknowns,
                depth + 1,
                field_name,
            );
            Value::Array(vec![item])
        }
        _ => {
            if let Some(guess) = guess_value(field_name.unwrap_or(path), &schema) {
                return guess;
            }
            match schema_type {
                Some("integer") => Value::from(0),
                Some("number") => Value::from(0.0),
                Some("boolean") => Value::from(false),
                _ => Value::String("<string>".to_string()),
            }
        }
    }
}

fn generate_object(
    schema: &Value,
    provided: &Value,
    path: &str,
    unknowns: &mut Vec<String>,
    discriminator: Option<&Discriminator>,
    depth: u32,
) -> Value {
    let properties = schema
        .get("properties")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();
    let required: HashSet<&str> = schema
        .get("required")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();
    let provided_obj = provided.as_object();

    let mut output = Map::new();
    let mut names: Vec<&String> = properties.keys().collect();
    names.sort();

    for name in names {
        let prop_schema = &properties[name];
        if !prop_schema.is_object() {
            continue;
        }
        let prop_provided = provided_obj
            .and_then(|o| o.get(name))
            .filter(|v| !v.is_null());
        let is_required = required.contains(name.as_str());

        if is_required && prop_provided.is_none() {
            unknowns.push(format!("{path}.{name}"));
        }
        if is_required || prop_provided.is_some() {
            let value = generate_from_schema(
                prop_schema,
                prop_provided,
                &format!("{path}.{name}"),
                unknowns,
                depth + 1,
                Some(name),
            );
            output.insert(name.clone(), value);
        }
    }

    if let Some(disc) = discriminator {
        if !output.contains_key(&disc.name) {
            if let Some(prop_schema) = properties.get(&disc.name).filter(|s| s.is_object()) {
                let value = if !disc.value.is_null() {
                    disc.value.clone()
                } else {
                    placeholder_for_schema(prop_schema, None)
                };
                output.insert(disc.name.clone(), value);
            } else if !disc.value.is_null() {
                output.insert(disc.name.clone(), disc.value.clone());
            }
        }
    }

    Value::Object(output)
}

/// A single placeholder value for `schema`, without threading through
/// `provided`/`unknowns`/`depth` — used for parameters and for filling in a
/// discriminator property that generation otherwise skipped.
fn placeholder_for_schema(schema: &Value, field_name: Option<&str>) -> Value {
    if !schema.is_object() {
        return Value::String("<string>".to_string());
    }
    let (selected, _) = select_union_schema(schema, None);
    let schema = normalize_schema(&selected);

    if let Some(const_value) = schema.get("const") {
        return const_value.clone();
    }
    if let Some(guess) = guess_value(field_name.unwrap_or(""), &schema) {
        return guess;
    }
    match schema.get("type").and_then(Value::as_str) {
        Some("integer") => Value::from(0),
        Some("number") => Value::from(0.0),
        Some("boolean") => Value::from(false),
        Some("array") => {
            let item_schema = schema
                .get("items")
                .filter(|s| s.is_object())
                .cloned()
                .unwrap_or_else(|| Value::Object(Map::new()));
            Value::Array(vec![placeholder_for_schema(&item_schema, field_name)])
        }
        Some("object") => Value::Object(Map::new()),
        _ => Value::String("<string>".to_string()),
    }
}

/// Merges `allOf` sub-schemas (union of `required`, merge of `properties`,
/// first-sub-wins for every other key) and infers `type: object`/`array`
/// from the presence of `properties`/`items` when `type` is absent.
fn normalize_schema(schema: &Value) -> Value {
    let Some(obj) = schema.as_object() else {
        return Value::Object(Map::new());
    };
    let mut schema_obj = obj.clone();

    if let Some(all_of) = obj.get("allOf").and_then(Value::as_array) {
        let mut merged = Map::new();
        let mut properties = Map::new();
        let mut required: BTreeSet<String> = BTreeSet::new();

        for sub in all_of {
            if !sub.is_object() {
                continue;
            }
            let sub_schema = normalize_schema(sub);
            let Some(sub_obj) = sub_schema.as_object() else { continue };

            if let Some(sub_props) = sub_obj.get("properties").and_then(Value::as_object) {
                for (key, value) in sub_props {
                    properties.insert(key.clone(), value.clone());
                }
            }
            if let Some(sub_required) = sub_obj.get("required").and_then(Value::as_array) {
                required.extend(sub_required.iter().filter_map(Value::as_str).map(str::to_string));
            }
            for (key, value) in sub_obj {
                if key == "properties" || key == "required" {
                    continue;
                }
                merged.entry(key.clone()).or_insert_with(|| value.clone());
            }
        }

        if !properties.is_empty() {
            let object_type = merged
                .get("type")
                .cloned()
                .unwrap_or_else(|| Value::String("object".to_string()));
            merged.insert("type".to_string(), object_type);
            merged.insert("properties".to_string(), Value::Object(properties));
        }
        if !required.is_empty() {
            merged.insert(
                "required".to_string(),
                Value::Array(required.into_iter().map(Value::String).collect()),
            );
        }
        for (key, value) in merged {
            schema_obj.insert(key, value);
        }
    }

    if !schema_obj.contains_key("type") {
        if schema_obj.get("properties").map(Value::is_object).unwrap_or(false) {
            schema_obj.insert("type".to_string(), Value::String("object".to_string()));
        } else if schema_obj.get("items").map(Value::is_object).unwrap_or(false) {
            schema_obj.insert("type".to_string(), Value::String("array".to_string()));
        }
    }

    Value::Object(schema_obj)
}

/// Resolves a `oneOf`/`anyOf` schema to the single sub-schema that should
/// drive generation, using the `discriminator` object when present: by the
/// caller-provided discriminator value, then by the mapping's first key,
/// then by inferring a value from each option's `const`/`enum`/`default`.
/// Falls back to the first option with no discriminator at all.
fn select_union_schema(schema: &Value, provided: Option<&Value>) -> (Value, Option<Discriminator>) {
    let Some(schema_obj) = schema.as_object() else {
        return (Value::Object(Map::new()), None);
    };

    for key in ["oneOf", "anyOf"] {
        let Some(options) = schema_obj.get(key).and_then(Value::as_array) else { continue };
        if options.is_empty() {
            continue;
        }

        if let Some(discriminator) = schema_obj.get("discriminator").and_then(Value::as_object) {
            if let Some(prop_name) = discriminator.get("propertyName").and_then(Value::as_str) {
                let mapping = discriminator.get("mapping").and_then(Value::as_object);

                let provided_value = provided
                    .and_then(Value::as_object)
                    .and_then(|p| p.get(prop_name))
                    .filter(|v| !v.is_null());
                if let Some(pv) = provided_value {
                    if let Some(selected) = select_by_discriminator(options, prop_name, pv, mapping) {
                        return (selected, Some(Discriminator { name: prop_name.to_string(), value: pv.clone() }));
                    }
                }

                if let Some(map) = mapping.filter(|m| !m.is_empty()) {
                    let mut keys: Vec<&String> = map.keys().collect();
                    keys.sort();
                    let mapping_value = Value::String(keys[0].clone());
                    if let Some(selected) = select_by_discriminator(options, prop_name, &mapping_value, Some(map)) {
                        return (
                            selected,
                            Some(Discriminator { name: prop_name.to_string(), value: mapping_value }),
                        );
                    }
                    return (
                        options[0].clone(),
                        Some(Discriminator { name: prop_name.to_string(), value: mapping_value }),
                    );
                }

                if let Some((inferred_schema, inferred_value)) = infer_discriminator_option(options, prop_name) {
                    return (
                        inferred_schema,
                        Some(Discriminator { name: prop_name.to_string(), value: inferred_value }),
                    );
                }
            }
        }

        if options[0].is_object() {
            return (options[0].clone(), None);
        }
    }

    (schema.clone(), None)
}

fn select_by_discriminator(
    options: &[Value],
    prop_name: &str,
    value: &Value,
    mapping: Option<&Map<String, Value>>,
) -> Option<Value> {
    if let Some(map) = mapping {
        if let Some(value_str) = value.as_str() {
            if let Some(target) = map.get(value_str) {
                if target.is_object() {
                    return Some(target.clone());
                }
                if let Some(target_str) = target.as_str() {
                    for option in options {
                        let Some(opt_obj) = option.as_object() else { continue };
                        if opt_obj.get("$ref").and_then(Value::as_str) == Some(target_str)
                            || opt_obj.get("$id").and_then(Value::as_str) == Some(target_str)
                            || opt_obj.get("title").and_then(Value::as_str) == Some(target_str)
                        {
                            return Some(option.clone());
                        }
                    }
                }
            }
        }
    }

    for option in options {
        if option.is_object() && option_matches_discriminator(option, prop_name, value) {
            return Some(option.clone());
        }
    }
    None
}

fn infer_discriminator_option(options: &[Value], prop_name: &str) -> Option<(Value, Value)> {
    for option in options {
        if !option.is_object() {
            continue;
        }
        if let Some(value) = infer_discriminator_value(option, prop_name) {
            return Some((option.clone(), value));
        }
    }
    None
}

fn option_matches_discriminator(option: &Value, prop_name: &str, value: &Value) -> bool {
    let schema = normalize_schema(option);
    let Some(properties) = schema.get("properties").and_then(Value::as_object) else { return false };
    let Some(prop_schema) = properties.get(prop_name) else { return false };

    if let Some(const_value) = prop_schema.get("const") {
        return const_value == value;
    }
    if let Some(enum_values) = prop_schema.get("enum").and_then(Value::as_array) {
        if enum_values.contains(value) {
            return true;
        }
    }
    if let Some(default_value) = prop_schema.get("default") {
        return default_value == value;
    }
    false
}

fn infer_discriminator_value(option: &Value, prop_name: &str) -> Option<Value> {
    let schema = normalize_schema(option);
    let properties = schema.get("properties")?.as_object()?;
    let prop_schema = properties.get(prop_name)?;

    if let Some(const_value) = prop_schema.get("const") {
        return Some(const_value.clone());
    }
    if let Some(first) = prop_schema.get("enum").and_then(Value::as_array).and_then(|e| e.first()) {
        return Some(first.clone());
    }
    prop_schema.get("default").cloned()
}

/// Deterministic field-name heuristics: a schema-typed placeholder value
/// chosen by matching common field-name substrings (email, uuid, name,
/// phone, ...), seeded from the field name itself so the same field always
/// produces the same value across runs.
fn guess_value(field_name: &str, schema: &Value) -> Option<Value> {
    let name = field_name.to_lowercase();
    let schema_type = schema.get("type").and_then(Value::as_str);
    let schema_format = schema.get("format").and_then(Value::as_str);

    match schema_type {
        Some("string") => {
            let mut rng = seeded_rng_for_key(field_name);
            if schema_format == Some("email") || name.contains("email") {
                return Some(Value::String(fake_email(&mut rng)));
            }
            if matches!(schema_format, Some("uuid") | Some("uuid4")) || name.contains("uuid") {
                return Some(Value::String(fake_uuid(&mut rng)));
            }
            if name.contains("name") {
                return Some(Value::String(if name.contains("first") {
                    fake_first_name(&mut rng)
                } else if name.contains("last") {
                    fake_last_name(&mut rng)
                } else {
                    format!("{} {}", fake_first_name(&mut rng), fake_last_name(&mut rng))
                }));
            }
            if name.contains("phone") {
                return Some(Value::String(fake_phone(&mut rng)));
            }
            if name.contains("zip") || name.contains("postal") {
                return Some(Value::String(fake_postcode(&mut rng)));
            }
            if name.contains("city") {
                return Some(Value::String(fake_city(&mut rng)));
            }
            if name.contains("country") {
                return Some(Value::String(fake_country_code(&mut rng)));
            }
            if name.contains("address") {
                return Some(Value::String(fake_street_address(&mut rng)));
            }
            if name.contains("url") || matches!(schema_format, Some("uri") | Some("url")) {
                return Some(Value::String(fake_url(&mut rng)));
            }
            if schema_format == Some("date") || name.contains("date") {
                return Some(Value::String(fake_date(&mut rng)));
            }
            if matches!(schema_format, Some("date-time") | Some("datetime")) || name.contains("time") {
                return Some(Value::String(fake_datetime(&mut rng)));
            }
            if name.contains("currency") {
                return Some(Value::String(fake_currency_code(&mut rng)));
            }
            if name.ends_with("id") || name.ends_with("_id") {
                return Some(Value::String(fake_uuid(&mut rng)));
            }
            Some(Value::String(fake_word(&mut rng)))
        }
        Some("integer") => {
            if name.contains("age") {
                return Some(Value::from(30));
            }
            if name.contains("count") {
                return Some(Value::from(1));
            }
            if name.contains("limit") {
                return Some(Value::from(10));
            }
            if name.contains("lives") {
                return Some(Value::from(9));
            }
            if name.ends_with("id") || name.ends_with("_id") {
                return Some(Value::from(1));
            }
            Some(Value::from(0))
        }
        Some("number") => {
            if ["amount", "price", "total", "cost"].iter().any(|k| name.contains(k)) {
                return Some(Value::from(100.0));
            }
            Some(Value::from(0.0))
        }
        Some("boolean") => Some(Value::from(false)),
        _ => None,
    }
}

fn seeded_rng_for_key(key: &str) -> StdRng {
    StdRng::seed_from_u64(seed_for_key(key))
}

/// Mirrors the original's `int(sha256(key)[:8 hex chars], 16)` seed.
fn seed_for_key(key: &str) -> u64 {
    let digest = Sha256::digest(key.as_bytes());
    let hex = format!("{digest:x}");
    u64::from_str_radix(&hex[..8], 16).unwrap_or(0)
}

const FIRST_NAMES: &[&str] = &[
    "James", "Mary", "Robert", "Patricia", "John", "Jennifer", "Michael", "Linda", "David", "Elizabeth",
];
const LAST_NAMES: &[&str] = &[
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis", "Rodriguez", "Martinez",
];
const CITIES: &[&str] = &[
    "Springfield", "Franklin", "Georgetown", "Salem", "Fairview", "Madison", "Arlington", "Ashland", "Clinton", "Riverside",
];
const COUNTRY_CODES: &[&str] = &["US", "GB", "DE", "FR", "CA", "AU", "JP", "BR", "IN", "NG"];
const STREET_NAMES: &[&str] = &["Main", "Oak", "Pine", "Maple", "Cedar", "Elm", "View", "Washington", "Park", "Lake"];
const STREET_SUFFIXES: &[&str] = &["St", "Ave", "Blvd", "Rd", "Ln", "Dr", "Ct", "Way"];
const WORDS: &[&str] = &["alpha", "bravo", "charlie", "delta", "echo", "foxtrot", "golf", "hotel", "india", "juliet"];
const CURRENCY_CODES: &[&str] = &["USD", "EUR", "GBP", "JPY", "CAD", "AUD", "CHF", "CNY"];

fn pick<'a>(rng: &mut StdRng, words: &[&'a str]) -> &'a str {
    words[rng.gen_range(0..words.len())]
}

fn fake_first_name(rng: &mut StdRng) -> String {
    pick(rng, FIRST_NAMES).to_string()
}

fn fake_last_name(rng: &mut StdRng) -> String {
    pick(rng, LAST_NAMES).to_string()
}

fn fake_email(rng: &mut StdRng) -> String {
    let first = pick(rng, FIRST_NAMES).to_lowercase();
    let last = pick(rng, LAST_NAMES).to_lowercase();
    format!("{first}.{last}{}@example.com", rng.gen_range(0..100))
}

fn fake_uuid(rng: &mut StdRng) -> String {
    let mut bytes = [0u8; 16];
    rng.fill(&mut bytes);
    uuid::Builder::from_random_bytes(bytes).into_uuid().to_string()
}

fn fake_phone(rng: &mut StdRng) -> String {
    format!(
        "+1-{:03}-{:03}-{:04}",
        rng.gen_range(200..999),
        rng.gen_range(200..999),
        rng.gen_range(0..10000)
    )
}

fn fake_postcode(rng: &mut StdRng) -> String {
    format!("{:05}", rng.gen_range(10000..99999))
}

fn fake_city(rng: &mut StdRng) -> String {
    pick(rng, CITIES).to_string()
}

fn fake_country_code(rng: &mut StdRng) -> String {
    pick(rng, COUNTRY_CODES).to_string()
}

fn fake_street_address(rng: &mut StdRng) -> String {
    format!(
        "{} {} {}",
        rng.gen_range(1..9999),
        pick(rng, STREET_NAMES),
        pick(rng, STREET_SUFFIXES)
    )
}

fn fake_url(rng: &mut StdRng) -> String {
    format!("https://example.com/{}", pick(rng, WORDS))
}

fn fake_date(rng: &mut StdRng) -> String {
    format!("2024-{:02}-{:02}", rng.gen_range(1..=12), rng.gen_range(1..=28))
}

fn fake_datetime(rng: &mut StdRng) -> String {
    format!(
        "2024-{:02}-{:02}T{:02}:{:02}:{:02}Z",
        rng.gen_range(1..=12),
        rng.gen_range(1..=28),
        rng.gen_range(0..24),
        rng.gen_range(0..60),
        rng.gen_range(0..60)
    )
}

fn fake_currency_code(rng: &mut StdRng) -> String {
    pick(rng, CURRENCY_CODES).to_string()
}

fn fake_word(rng: &mut StdRng) -> String {
    pick(rng, WORDS).to_string()
}
