//! Outbound HTTP execution of a synthesized or caller-built request against
//! the upstream API described by a spec's `servers` block.

use std::time::{Duration, Instant};

use serde_json::{Map, Value};

use crate::config::CatalogConfig;
use crate::snippets::{normalize_request, render_path, render_query, value_to_string};

/// Result of `execute_request`. Either `ok=false` with an `error` message
/// (execution disabled, bad request shape, or a network failure), or
/// `ok=true` with the upstream response, regardless of its HTTP status.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ExecutionResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExecutionResponse {
    fn error(message: impl Into<String>) -> Self {
        Self { ok: false, status: None, time: None, body: None, error: Some(message.into()) }
    }

    fn disabled() -> Self {
        Self::error("Execution disabled. Set OPENAPI_EXECUTION=1 to enable.")
    }

    /// The result returned by the engine when `endpointId` does not resolve
    /// to a known operation.
    pub fn unknown_endpoint() -> Self {
        Self::error("Unknown endpointId")
    }
}

/// Execute `request` (a `build_payload`-style envelope or a bare
/// `{method, path, ...}` object) against the base URL resolved from `config`
/// or `spec.servers`. Disabled unless `config.execution_enabled`.
pub async fn execute_request(
    config: &CatalogConfig,
    spec: &Value,
    request: &Value,
    auth_token: Option<&str>,
) -> ExecutionResponse {
    if !config.execution_enabled {
        return ExecutionResponse::disabled();
    }

    let Some(normalized) = normalize_request(request) else {
        return ExecutionResponse::error("Request must include method and path");
    };

    let method = normalized.get("method").and_then(Value::as_str).unwrap_or("GET").to_uppercase();
    let path = normalized.get("path").and_then(Value::as_str).unwrap_or("");
    let parameters = normalized.get("parameters").and_then(Value::as_object);
    let path_params = parameters.and_then(|p| p.get("path")).and_then(Value::as_object);
    let query_params = parameters.and_then(|p| p.get("query")).and_then(Value::as_object);
    let header_params = parameters.and_then(|p| p.get("header")).and_then(Value::as_object);
    let content_type = normalized.get("contentType").and_then(Value::as_str);
    let body = normalized.get("body").filter(|v| !v.is_null());

    let Some(base_url) = resolve_base_url(config, spec) else {
        return ExecutionResponse::error("No base URL could be resolved");
    };

    let rendered_path = render_path(path, path_params);
    let query_string = query_params.map(render_query).unwrap_or_default();
    let url = format!("{base_url}{rendered_path}{query_string}");

    let mut headers = header_params.cloned().unwrap_or_default();
    if let (Some(ct), Some(_)) = (content_type, body) {
        headers.entry("Content-Type".to_string()).or_insert_with(|| Value::String(ct.to_string()));
    }
    apply_auth(&mut headers, auth_token);

    let client = match reqwest::Client::builder().timeout(Duration::from_secs(30)).build() {
        Ok(client) => client,
        Err(err) => return ExecutionResponse::error(err.to_string()),
    };
    let method = match reqwest::Method::from_bytes(method.as_bytes()) {
        Ok(method) => method,
        Err(_) => reqwest::Method::GET,
    };

    let mut builder = client.request(method, &url);
    for (name, value) in &headers {
        builder = builder.header(name, value_to_string(value));
    }

    let is_form = content_type
        .map(|ct| ct.contains("application/x-www-form-urlencoded"))
        .unwrap_or(false);
    if let Some(body_value) = body {
        if is_form {
            if let Some(obj) = body_value.as_object() {
                let form: Vec<(String, String)> =
                    obj.iter().map(|(k, v)| (k.clone(), value_to_string(v))).collect();
                builder = builder.form(&form);
            }
        } else {
            builder = builder.json(body_value);
        }
    }

    let started = Instant::now();
    let response = match builder.send().await {
        Ok(response) => response,
        Err(err) => return ExecutionResponse::error(err.to_string()),
    };
    let status = response.status().as_u16();
    let text = match response.text().await {
        Ok(text) => text,
        Err(err) => return ExecutionResponse::error(err.to_string()),
    };
    let elapsed_ms = started.elapsed().as_millis();
    let body = serde_json::from_str::<Value>(&text).unwrap_or(Value::String(text));

    ExecutionResponse {
        ok: true,
        status: Some(status),
        time: Some(format!("{elapsed_ms}ms")),
        body: Some(body),
        error: None,
    }
}

fn resolve_base_url(config: &CatalogConfig, spec: &Value) -> Option<String> {
    if let Some(ref over) = config.base_url_override {
        return Some(over.trim_end_matches('/').to_string());
    }
    let servers = spec.get("servers")?.as_array()?;
    let first = servers.first()?.as_object()?;
    let mut url = first.get("url")?.as_str()?.to_string();
    if let Some(vars) = first.get("variables").and_then(Value::as_object) {
        for (name, var) in vars {
            if let Some(default) = var.get("default").and_then(Value::as_str) {
                url = url.replace(&format!("{{{name}}}"), default);
            }
        }
    }
    Some(url.trim_end_matches('/').to_string())
}

fn apply_auth(headers: &mut Map<String, Value>, auth_token: Option<&str>) {
    let token = auth_token
        .map(str::to_string)
        .or_else(|| std::env::var("API_KEY").ok())
        .or_else(|| std::env::var("API_TOKEN").ok());
    if let Some(token) = token {
        let value = if token.contains(' ') { token } else { format!("Bearer {token}") };
        headers.insert("Authorization".to_string(), Value::String(value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config(execution_enabled: bool, base_url_override: Option<&str>) -> CatalogConfig {
        CatalogConfig {
            spec_dir: "specs".into(),
            index_path: ":memory:".into(),
            deref_mode: crate::config::DerefMode::Lazy,
            semantic_enabled: false,
            embed_model: "BAAI/bge-small-en-v1.5".into(),
            execution_enabled,
            base_url_override: base_url_override.map(str::to_string),
            watch_enabled: false,
            watch_interval_secs: 2,
        }
    }

    #[tokio::test]
    async fn disabled_execution_returns_error_without_sending() {
        let response =
            execute_request(&config(false, None), &json!({}), &json!({"method": "get", "path": "/pets"}), None)
                .await;
        assert!(!response.ok);
        assert!(response.error.unwrap().contains("Execution disabled"));
    }

    #[tokio::test]
    async fn missing_base_url_is_an_error() {
        let response = execute_request(
            &config(true, None),
            &json!({}),
            &json!({"method": "get", "path": "/pets"}),
            None,
        )
        .await;
        assert!(!response.ok);
        assert_eq!(response.error.as_deref(), Some("No base URL could be resolved"));
    }

    #[test]
    fn resolve_base_url_prefers_override_and_trims_trailing_slash() {
        let cfg = config(true, Some("https://api.example.com/"));
        let spec = json!({});
        assert_eq!(resolve_base_url(&cfg, &spec).as_deref(), Some("https://api.example.com"));
    }

    #[test]
    fn resolve_base_url_substitutes_server_variables() {
        let cfg = config(true, None);
        let spec = json!({
            "servers": [{"url": "https://{env}.example.com/v1", "variables": {"env": {"default": "prod"}}}]
        });
        assert_eq!(resolve_base_url(&cfg, &spec).as_deref(), Some("https://prod.example.com/v1"));
    }

    #[test]
    fn apply_auth_prefixes_bearer_when_no_space() {
        let mut headers = Map::new();
        apply_auth(&mut headers, Some("secret-token"));
        assert_eq!(headers["Authorization"], json!("Bearer secret-token"));
    }

    #[test]
    fn apply_auth_uses_verbatim_value_when_it_contains_a_space() {
        let mut headers = Map::new();
        apply_auth(&mut headers, Some("Basic abc123"));
        assert_eq!(headers["Authorization"], json!("Basic abc123"));
    }

    #[test]
    fn apply_auth_overwrites_caller_supplied_header_when_a_token_resolves() {
        let mut headers = Map::new();
        headers.insert("Authorization".to_string(), json!("Bearer caller"));
        apply_auth(&mut headers, Some("secret-token"));
        assert_eq!(headers["Authorization"], json!("Bearer secret-token"));
    }
}
