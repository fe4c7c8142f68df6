//! Process-wide configuration, read once from the environment.

use std::env;

/// How aggressively `$ref` pointers are resolved while loading a spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DerefMode {
    /// Resolve refs lazily, only where a component actually needs them.
    Lazy,
    /// Eagerly dereference the entire document up front (`prance`-style).
    Full,
}

impl DerefMode {
    fn from_env_value(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "full" => Self::Full,
            _ => Self::Lazy,
        }
    }
}

/// Parsed configuration for a `CatalogEngine`, sourced from environment
/// variables. This is the only place the crate reads `std::env::var` for
/// process-wide settings; per-request values (such as an auth token at
/// execution time) are read where they are used.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub spec_dir: String,
    pub index_path: String,
    pub deref_mode: DerefMode,
    pub semantic_enabled: bool,
    pub embed_model: String,
    pub execution_enabled: bool,
    pub base_url_override: Option<String>,
    pub watch_enabled: bool,
    pub watch_interval_secs: u64,
}

impl CatalogConfig {
    /// Build a configuration from the process environment, applying the
    /// same defaults as the reference implementation.
    pub fn from_env() -> Self {
        Self {
            spec_dir: env::var("OPENAPI_DIR").unwrap_or_else(|_| "specs".to_string()),
            index_path: env::var("OPENAPI_INDEX_PATH").unwrap_or_else(|_| ":memory:".to_string()),
            deref_mode: env::var("OPENAPI_DEREF_MODE")
                .map(|v| DerefMode::from_env_value(&v))
                .unwrap_or(DerefMode::Lazy),
            semantic_enabled: is_truthy(env::var("OPENAPI_SEMANTIC").ok().as_deref()),
            embed_model: env::var("OPENAPI_EMBED_MODEL")
                .unwrap_or_else(|_| "BAAI/bge-small-en-v1.5".to_string()),
            execution_enabled: is_truthy(env::var("OPENAPI_EXECUTION").ok().as_deref()),
            base_url_override: env::var("OPENAPI_BASE_URL").ok(),
            watch_enabled: is_truthy(env::var("OPENAPI_WATCH").ok().as_deref()),
            watch_interval_secs: env::var("OPENAPI_WATCH_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(2),
        }
    }
}

fn is_truthy(value: Option<&str>) -> bool {
    matches!(value, Some("1") | Some("true") | Some("True") | Some("TRUE"))
}
