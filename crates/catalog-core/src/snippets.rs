//! Renders a synthesized request into ready-to-run client snippets.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::model::canonicalize;

/// Renders `request` (a `build_payload`-style envelope, a bare
/// `{method, path, ...}` object, or anything wrapping one under a
/// `"request"` key) into one snippet per entry of `languages`. Unknown
/// language names are silently skipped; an unrecognizable request shape
/// yields an empty map.
pub fn generate_snippets(request: &Value, languages: &[&str]) -> BTreeMap<String, String> {
    let mut snippets = BTreeMap::new();
    let Some(normalized) = normalize_request(request) else {
        return snippets;
    };

    let method = normalized.get("method").and_then(Value::as_str).unwrap_or("").to_uppercase();
    let path = normalized.get("path").and_then(Value::as_str).unwrap_or("");
    let parameters = normalized.get("parameters").and_then(Value::as_object);
    let path_params = parameters.and_then(|p| p.get("path")).and_then(Value::as_object);
    let query_params = parameters.and_then(|p| p.get("query")).and_then(Value::as_object);
    let header_params = parameters.and_then(|p| p.get("header")).and_then(Value::as_object);

    let rendered_path = render_path(path, path_params);
    let query_string = query_params.map(render_query).unwrap_or_default();
    let url = format!("{{{{base_url}}}}{rendered_path}{query_string}");

    let mut headers = header_params.cloned().unwrap_or_default();
    let content_type = normalized.get("contentType").and_then(Value::as_str);
    let body = normalized.get("body").filter(|v| !v.is_null());
    if let (Some(ct), Some(_)) = (content_type, body) {
        headers
            .entry("Content-Type".to_string())
            .or_insert_with(|| Value::String(ct.to_string()));
    }

    let payload = body.map(|b| serde_json::to_string_pretty(&canonicalize(b)).unwrap_or_default());

    for lang in languages {
        match *lang {
            "curl" => {
                snippets.insert("curl".to_string(), curl_snippet(&method, &url, &headers, payload.as_deref()));
            }
            "python" => {
                snippets.insert("python".to_string(), python_snippet(&method, &url, &headers, body));
            }
            "ts" => {
                snippets.insert("ts".to_string(), ts_snippet(&method, &url, &headers, payload.as_deref()));
            }
            _ => {}
        }
    }
    snippets
}

pub(crate) fn normalize_request(request: &Value) -> Option<&Value> {
    if let Some(inner) = request.get("request").filter(|v| v.is_object()) {
        return Some(inner);
    }
    if request.is_object() && request.get("method").is_some() && request.get("path").is_some() {
        return Some(request);
    }
    None
}

pub(crate) fn render_path(path: &str, path_params: Option<&Map<String, Value>>) -> String {
    let Some(params) = path_params else {
        return path.to_string();
    };
    let mut rendered = path.to_string();
    for (name, value) in params {
        rendered = rendered.replace(&format!("{{{name}}}"), &value_to_string(value));
    }
    rendered
}

pub(crate) fn render_query(query_params: &Map<String, Value>) -> String {
    if query_params.is_empty() {
        return String::new();
    }
    let mut pairs = Vec::new();
    for (key, value) in query_params {
        let encoded_key = urlencoding::encode(key);
        match value {
            Value::Array(items) => {
                for item in items {
                    pairs.push(format!("{encoded_key}={}", urlencoding::encode(&value_to_string(item))));
                }
            }
            other => pairs.push(format!("{encoded_key}={}", urlencoding::encode(&value_to_string(other)))),
        }
    }
    format!("?{}", pairs.join("&"))
}

pub(crate) fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn curl_snippet(method: &str, url: &str, headers: &Map<String, Value>, payload: Option<&str>) -> String {
    let mut parts = vec!["curl".to_string(), "-X".to_string(), method.to_string(), format!("\"{url}\"")];
    for (name, value) in headers {
        parts.push("-H".to_string());
        parts.push(format!("\"{name}: {}\"", value_to_string(value)));
    }
    if let Some(body) = payload {
        parts.push("-d".to_string());
        parts.push(format!("'{body}'"));
    }
    parts.join(" ")
}

fn python_snippet(method: &str, url: &str, headers: &Map<String, Value>, body: Option<&Value>) -> String {
    let mut lines = vec!["import requests".to_string(), String::new(), format!("url = \"{url}\"")];
    if headers.is_empty() {
        lines.push("headers = {}".to_string());
    } else {
        let rendered = serde_json::to_string_pretty(&canonicalize(&Value::Object(headers.clone()))).unwrap_or_default();
        lines.push(format!("headers = {rendered}"));
    }

    if let Some(body) = body {
        let rendered = serde_json::to_string_pretty(&canonicalize(body)).unwrap_or_default();
        lines.push(format!("payload = {rendered}"));
        lines.push(format!("response = requests.request(\"{method}\", url, headers=headers, json=payload)"));
    } else {
        lines.push(format!("response = requests.request(\"{method}\", url, headers=headers)"));
    }

    lines.push("print(response.status_code)".to_string());
    lines.push("print(response.text)".to_string());
    lines.join("\n")
}

fn ts_snippet(method: &str, url: &str, headers: &Map<String, Value>, payload: Option<&str>) -> String {
    let headers_json = serde_json::to_string_pretty(&canonicalize(&Value::Object(headers.clone()))).unwrap_or_default();
    let mut lines = vec![
        format!("const url = \"{url}\";"),
        format!("const headers = {headers_json};"),
        String::new(),
    ];
    if let Some(body) = payload {
        lines.push(format!("const body = {body};"));
    }
    let body_line = if payload.is_some() { "  body: JSON.stringify(body)\n" } else { "" };
    lines.push(format!("fetch(url, {{\n  method: \"{method}\",\n  headers,\n{body_line}}});"));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn renders_path_and_query_parameters() {
        let request = json!({
            "request": {
                "method": "get",
                "path": "/pets/{petId}",
                "contentType": Value::Null,
                "parameters": {"path": {"petId": "abc"}, "query": {"limit": 10}, "header": {}},
                "body": Value::Null,
            }
        });
        let snippets = generate_snippets(&request, &["curl"]);
        let curl = &snippets["curl"];
        assert!(curl.contains("\"{{base_url}}/pets/abc?limit=10\""));
        assert!(curl.contains("-X GET"));
    }

    #[test]
    fn includes_content_type_header_only_when_body_present() {
        let request = json!({
            "method": "post",
            "path": "/pets",
            "contentType": "application/json",
            "parameters": {"path": {}, "query": {}, "header": {}},
            "body": {"name": "Rex"},
        });
        let snippets = generate_snippets(&request, &["curl", "python", "ts"]);
        assert!(snippets["curl"].contains("Content-Type: application/json"));
        assert!(snippets["python"].contains("payload = {"));
        assert!(snippets["ts"].contains("JSON.stringify(body)"));
    }

    #[test]
    fn unrecognizable_request_yields_no_snippets() {
        let snippets = generate_snippets(&json!({"foo": "bar"}), &["curl"]);
        assert!(snippets.is_empty());
    }

    #[test]
    fn unknown_language_is_skipped() {
        let request = json!({"method": "get", "path": "/ping"});
        let snippets = generate_snippets(&request, &["curl", "rust"]);
        assert_eq!(snippets.len(), 1);
        assert!(snippets.contains_key("curl"));
    }
}
