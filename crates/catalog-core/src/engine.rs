//! The Catalog Engine: the orchestrator that owns the Index Store, the
//! in-memory parsed-spec map, the refresh mutex, and implements every public
//! operation in the catalog's tool surface.

use std::collections::HashMap;
use std::path::Path;

use serde_json::Value;
use tokio::sync::Mutex;

use crate::config::{CatalogConfig, DerefMode};
use crate::error::Result;
use crate::execute::{self, ExecutionResponse};
use crate::extract;
use crate::fusion;
use crate::index::{CatalogIndex, OperationMatch, SchemaMatch};
use crate::model::{canonicalize, Operation, SpecFingerprint, SpecMeta};
use crate::payload;
use crate::render;
use crate::resolve;
use crate::semantic::SemanticIndex;
use crate::spec_loader;
use crate::validate::{self, ValidationResult};

const DEFAULT_SEARCH_LIMIT: usize = 25;

struct EngineInner {
    index: CatalogIndex,
    semantic: SemanticIndex,
    specs: HashMap<String, Value>,
    spec_paths: HashMap<String, String>,
    spec_versions: HashMap<String, Option<String>>,
    spec_meta: Vec<SpecMeta>,
    last_fingerprints: Vec<SpecFingerprint>,
}

/// Owns everything needed to answer catalog queries and to rebuild the
/// catalog from a spec corpus. Refresh and every read operation serialize
/// behind a single mutex (held only for the duration of one request; network
/// calls in `execute_request` happen after the guard is dropped).
pub struct CatalogEngine {
    config: CatalogConfig,
    inner: Mutex<EngineInner>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct CachedFingerprint {
    spec_id: String,
    relative_path: String,
    size: u64,
    mtime: i64,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct CacheFile {
    version: u32,
    spec_dir: String,
    fingerprints: Vec<CachedFingerprint>,
    spec_meta: Vec<SpecMeta>,
    spec_versions: HashMap<String, Option<String>>,
}

impl CatalogEngine {
    /// Open the index at `config.index_path` and build an engine around it.
    /// Does not perform an initial refresh; callers invoke `refresh` once at
    /// startup per the lifecycle in the design notes.
    pub fn new(config: CatalogConfig) -> Result<Self> {
        let index = CatalogIndex::open(&config.index_path)?;
        let semantic = SemanticIndex::new(Some(config.embed_model.clone()));
        Ok(Self {
            config,
            inner: Mutex::new(EngineInner {
                index,
                semantic,
                specs: HashMap::new(),
                spec_paths: HashMap::new(),
                spec_versions: HashMap::new(),
                spec_meta: Vec::new(),
                last_fingerprints: Vec::new(),
            }),
        })
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Rebuild or reload the catalog. When `use_cache` is true and the
    /// sidecar cache is present, valid, and fingerprint-fresh, the index is
    /// left untouched and only the in-memory spec map is reloaded from disk;
    /// otherwise a full rebuild runs and the cache is rewritten.
    pub async fn refresh(&self, use_cache: bool) -> Result<()> {
        let mut inner = self.inner.lock().await;
        let spec_dir = Path::new(&self.config.spec_dir);
        let current_fingerprints = spec_loader::fingerprint_spec_files(spec_dir)?;

        if use_cache {
            if let Some(cache) = self.try_load_cache(&inner.index, &current_fingerprints) {
                tracing::info!(spec_dir = %self.config.spec_dir, "loaded catalog from cache");
                self.populate_specs_from_disk(&mut inner, spec_dir)?;
                inner.spec_meta = cache.spec_meta;
                inner.spec_versions = cache.spec_versions;
                inner.last_fingerprints = current_fingerprints;
                if self.config.semantic_enabled && inner.semantic.available() {
                    if let Ok(rows) = inner.index.load_operation_embeddings() {
                        inner.semantic.load(&rows);
                    }
                }
                return Ok(());
            }
            tracing::debug!("cache miss or stale, performing full rebuild");
        }

        self.full_rebuild(&mut inner, spec_dir, current_fingerprints).await
    }

    fn try_load_cache(&self, index: &CatalogIndex, current: &[SpecFingerprint]) -> Option<CacheFile> {
        if self.config.index_path == ":memory:" {
            return None;
        }
        let meta_path = cache_path(&self.config.index_path);
        let contents = std::fs::read_to_string(&meta_path).ok()?;
        let cache: CacheFile = serde_json::from_str(&contents).ok()?;
        if !index.is_ready().ok()? {
            return None;
        }
        if cache.spec_dir != self.config.spec_dir {
            return None;
        }
        if !fingerprints_equal(current, &cache.fingerprints) {
            return None;
        }
        Some(cache)
    }

    fn populate_specs_from_disk(&self, inner: &mut EngineInner, spec_dir: &Path) -> Result<()> {
        let spec_files = spec_loader::build_spec_files(spec_dir)?;
        let mut specs = HashMap::new();
        let mut spec_paths = HashMap::new();
        for result in spec_files {
            let spec_file = match result {
                spec_loader::SpecLoadResult::Loaded(spec_file) => spec_file,
                spec_loader::SpecLoadResult::Failed { .. } => continue,
            };
            let document = match self.config.deref_mode {
                DerefMode::Full => resolve::dereference_document(&spec_file.raw),
                DerefMode::Lazy => spec_file.raw,
            };
            spec_paths.insert(spec_file.spec_id.clone(), spec_file.path.clone());
            specs.insert(spec_file.spec_id, document);
        }
        inner.specs = specs;
        inner.spec_paths = spec_paths;
        Ok(())
    }

    async fn full_rebuild(
        &self,
        inner: &mut EngineInner,
        spec_dir: &Path,
        fingerprints: Vec<SpecFingerprint>,
    ) -> Result<()> {
        let spec_files = spec_loader::build_spec_files(spec_dir)?;
        inner.index.reset()?;

        let mut specs = HashMap::new();
        let mut spec_paths = HashMap::new();
        let mut spec_versions = HashMap::new();
        let mut spec_meta = Vec::new();
        let mut all_operations = Vec::new();
        let mut all_schemas = Vec::new();
        let mut cached_fingerprints = Vec::with_capacity(fingerprints.len());

        for (spec_file, fingerprint) in spec_files.iter().zip(fingerprints.iter()) {
            let (spec_id, path, raw) = match spec_file {
                spec_loader::SpecLoadResult::Loaded(spec_file) => {
                    (spec_file.spec_id.clone(), spec_file.path.clone(), Some(&spec_file.raw))
                }
                spec_loader::SpecLoadResult::Failed { spec_id, path, error, .. } => {
                    spec_meta.push(SpecMeta {
                        spec_id: spec_id.clone(),
                        title: None,
                        version: None,
                        description: None,
                        file_path: path.clone(),
                        operation_count: 0,
                        schema_count: 0,
                        is_valid: false,
                        validation_error: Some(error.clone()),
                    });
                    cached_fingerprints.push(CachedFingerprint {
                        spec_id: spec_id.clone(),
                        relative_path: fingerprint.relative_path.clone(),
                        size: fingerprint.size,
                        mtime: fingerprint.mtime,
                    });
                    spec_versions.insert(spec_id.clone(), None);
                    spec_paths.insert(spec_id.clone(), path.clone());
                    continue;
                }
            };
            let raw = raw.expect("Loaded variant always carries raw");

            let (is_valid, validation_error) = validate::validate_spec_document(raw);
            let openapi_version = raw.get("openapi").and_then(Value::as_str).map(str::to_string);
            let info = raw.get("info");
            let info_version =
                info.and_then(|i| i.get("version")).and_then(Value::as_str).map(str::to_string);
            let title = info.and_then(|i| i.get("title")).and_then(Value::as_str).map(str::to_string);
            let description =
                info.and_then(|i| i.get("description")).and_then(Value::as_str).map(str::to_string);

            let document = match self.config.deref_mode {
                DerefMode::Full => resolve::dereference_document(raw),
                DerefMode::Lazy => raw.clone(),
            };

            let (operations, schemas) = if is_valid {
                (
                    extract::extract_operations(&spec_id, &document),
                    extract::extract_schemas(&spec_id, &document),
                )
            } else {
                (Vec::new(), Vec::new())
            };

            spec_meta.push(SpecMeta {
                spec_id: spec_id.clone(),
                title,
                version: info_version,
                description,
                file_path: path.clone(),
                operation_count: operations.len(),
                schema_count: schemas.len(),
                is_valid,
                validation_error,
            });
            cached_fingerprints.push(CachedFingerprint {
                spec_id: spec_id.clone(),
                relative_path: fingerprint.relative_path.clone(),
                size: fingerprint.size,
                mtime: fingerprint.mtime,
            });

            spec_versions.insert(spec_id.clone(), openapi_version);
            spec_paths.insert(spec_id.clone(), path.clone());
            specs.insert(spec_id.clone(), document);

            all_operations.extend(operations);
            all_schemas.extend(schemas);
        }

        inner.index.add_operations(&all_operations)?;
        inner.index.add_schemas(&all_schemas)?;

        if self.config.semantic_enabled && inner.semantic.available() {
            let ids: Vec<String> = all_operations.iter().map(|op| op.op_key()).collect();
            let texts: Vec<String> = all_operations.iter().map(semantic_text).collect();
            let rows: Vec<(&str, &str)> =
                ids.iter().zip(texts.iter()).map(|(id, text)| (id.as_str(), text.as_str())).collect();
            let persisted = inner.semantic.build(&rows);
            inner.index.add_operation_embeddings(&persisted)?;
        }

        spec_meta.sort_by(|a, b| a.spec_id.cmp(&b.spec_id));

        inner.specs = specs;
        inner.spec_paths = spec_paths;
        inner.spec_versions = spec_versions;
        inner.spec_meta = spec_meta;
        inner.last_fingerprints = fingerprints;

        self.write_cache(&cached_fingerprints, &inner.spec_meta, &inner.spec_versions);

        Ok(())
    }

    fn write_cache(
        &self,
        fingerprints: &[CachedFingerprint],
        spec_meta: &[SpecMeta],
        spec_versions: &HashMap<String, Option<String>>,
    ) {
        if self.config.index_path == ":memory:" {
            return;
        }
        let meta_path = cache_path(&self.config.index_path);
        let cache = CacheFile {
            version: 1,
            spec_dir: self.config.spec_dir.clone(),
            fingerprints: fingerprints.to_vec(),
            spec_meta: spec_meta.to_vec(),
            spec_versions: spec_versions.clone(),
        };
        if let Some(parent) = Path::new(&meta_path).parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        match serde_json::to_string_pretty(&cache) {
            Ok(json) => {
                if let Err(err) = std::fs::write(&meta_path, json) {
                    tracing::warn!(error = %err, path = %meta_path, "failed to write catalog cache");
                }
            }
            Err(err) => tracing::warn!(error = %err, "failed to serialize catalog cache"),
        }
    }

    /// `{specs:[SpecMeta]}` sorted by `spec_id`.
    pub async fn get_catalog(&self) -> Value {
        let inner = self.inner.lock().await;
        canonicalize(&serde_json::json!({"specs": inner.spec_meta}))
    }

    /// Whether semantic search is both configured and actually available
    /// (embedding backend initialized successfully).
    pub async fn semantic_enabled(&self) -> bool {
        if !self.config.semantic_enabled {
            return false;
        }
        let mut inner = self.inner.lock().await;
        inner.semantic.available()
    }

    /// Lexical-only search, limited to 25 results.
    pub async fn search_operations(&self, query: &str, spec_id: Option<&str>) -> Vec<OperationMatch> {
        let inner = self.inner.lock().await;
        inner.index.search_operations(query, spec_id, DEFAULT_SEARCH_LIMIT).unwrap_or_default()
    }

    /// Lexical-only schema search, limited to 25 results.
    pub async fn search_schemas(&self, query: &str, spec_id: Option<&str>) -> Vec<SchemaMatch> {
        let inner = self.inner.lock().await;
        inner.index.search_schemas(query, spec_id, DEFAULT_SEARCH_LIMIT).unwrap_or_default()
    }

    /// Fused lexical + semantic search: `{query, audience, matches}`.
    pub async fn catalog_search(&self, query: &str, audience: Option<&str>) -> Value {
        let mut inner = self.inner.lock().await;

        let fts_matches = inner
            .index
            .search_operations(query, None, DEFAULT_SEARCH_LIMIT.max(50))
            .unwrap_or_default();
        let fts_ids: Vec<String> = fts_matches.iter().map(|m| m.endpoint_id.clone()).collect();
        let mut by_id: HashMap<String, OperationMatch> =
            fts_matches.into_iter().map(|m| (m.endpoint_id.clone(), m)).collect();

        let semantic_ids = if self.config.semantic_enabled && inner.semantic.available() {
            let top_k = (DEFAULT_SEARCH_LIMIT * 2).max(50);
            inner.semantic.search(query, top_k)
        } else {
            Vec::new()
        };

        let fused_ids = fusion::rrf_merge(&fts_ids, &semantic_ids, DEFAULT_SEARCH_LIMIT);

        let mut matches = Vec::with_capacity(fused_ids.len());
        for id in &fused_ids {
            if let Some(m) = by_id.remove(id) {
                matches.push(m);
            } else if let Ok(Some(m)) = inner.index.get_operation_match_by_id(id) {
                matches.push(m);
            }
        }

        canonicalize(&serde_json::json!({
            "query": query,
            "audience": audience,
            "matches": matches,
        }))
    }

    /// Rendered operation (canonical JSON), or `{}` when not found.
    pub async fn get_operation_by_operation_id(&self, spec_id: &str, operation_id: &str) -> Value {
        let inner = self.inner.lock().await;
        match inner.index.get_operation_by_operation_id(spec_id, operation_id) {
            Ok(Some(record)) => render::render_operation(&record),
            _ => empty_object(),
        }
    }

    /// Rendered operation (canonical JSON), or `{}` when not found.
    pub async fn get_operation_by_path_method(&self, spec_id: &str, path: &str, method: &str) -> Value {
        let inner = self.inner.lock().await;
        match inner.index.get_operation_by_path_method(spec_id, path, method) {
            Ok(Some(record)) => render::render_operation(&record),
            _ => empty_object(),
        }
    }

    /// Rendered schema (canonical JSON), or `{}` when not found.
    pub async fn get_schema(&self, spec_id: &str, schema_name: &str) -> Value {
        let inner = self.inner.lock().await;
        match inner.index.get_schema(spec_id, schema_name) {
            Ok(Some(record)) => render::render_schema(&record),
            _ => empty_object(),
        }
    }

    /// Endpoint contract: parameters always; `requestBody`/`responses` only
    /// when `full` is true, with local `$ref`s resolved.
    pub async fn endpoint_get(&self, endpoint_id: &str, full: bool) -> Value {
        let inner = self.inner.lock().await;
        let Ok(Some(record)) = inner.index.get_operation_by_endpoint_id(endpoint_id) else {
            return empty_object();
        };
        let spec = inner.specs.get(&record.spec_id);
        render::render_contract(endpoint_id, &record, full, spec)
    }

    /// Synthesize a request skeleton for `endpoint_id` per §4.8, or `{}`
    /// when the endpoint is unknown.
    pub async fn payload_generate(&self, endpoint_id: &str, provided_fields: Option<&Value>) -> Value {
        let inner = self.inner.lock().await;
        let Ok(Some(record)) = inner.index.get_operation_by_endpoint_id(endpoint_id) else {
            return empty_object();
        };
        let spec_id = record.spec_id.clone();
        let spec = matches!(self.config.deref_mode, DerefMode::Lazy)
            .then(|| inner.specs.get(&spec_id))
            .flatten();
        let operation: Operation = record.into();
        let provided = provided_fields.cloned().unwrap_or_else(|| Value::Object(Default::default()));
        canonicalize(&payload::build_payload(endpoint_id, &operation, &provided, spec))
    }

    /// Validate `request`'s body against `endpoint_id`'s request body schema.
    pub async fn payload_validate(&self, endpoint_id: &str, request: &Value) -> ValidationResult {
        let inner = self.inner.lock().await;
        let Ok(Some(record)) = inner.index.get_operation_by_endpoint_id(endpoint_id) else {
            return ValidationResult::unknown_endpoint();
        };
        let spec_id = record.spec_id.clone();
        let spec_version = inner.spec_versions.get(&spec_id).cloned().flatten();
        let spec = inner.specs.get(&spec_id).cloned();
        let operation: Operation = record.into();
        validate::validate_payload(&operation, request, spec_version.as_deref(), spec.as_ref())
    }

    /// Render `request` into one snippet per language (default
    /// `["curl", "python", "ts"]`).
    pub fn snippet_generate(&self, request: &Value, languages: Option<&[&str]>) -> Value {
        let default_languages = ["curl", "python", "ts"];
        let languages = languages.unwrap_or(&default_languages);
        let snippets = crate::snippets::generate_snippets(request, languages);
        canonicalize(&serde_json::json!({"snippets": snippets}))
    }

    /// Execute `request` against the upstream API for `endpoint_id`. The
    /// mutex is released before the network call runs.
    pub async fn execute_request(
        &self,
        endpoint_id: &str,
        request: &Value,
        auth_token: Option<&str>,
    ) -> ExecutionResponse {
        let spec = {
            let inner = self.inner.lock().await;
            let Ok(Some(record)) = inner.index.get_operation_by_endpoint_id(endpoint_id) else {
                return ExecutionResponse::unknown_endpoint();
            };
            inner.specs.get(&record.spec_id).cloned().unwrap_or(Value::Null)
        };
        execute::execute_request(&self.config, &spec, request, auth_token).await
    }
}

fn empty_object() -> Value {
    Value::Object(Default::default())
}

fn semantic_text(op: &Operation) -> String {
    let tags = op.tags.join(" ");
    [
        op.operation_id.as_deref(),
        op.summary.as_deref(),
        op.description.as_deref(),
        Some(op.method.as_str()),
        Some(op.path.as_str()),
        Some(tags.as_str()),
    ]
    .into_iter()
    .flatten()
    .filter(|s| !s.is_empty())
    .collect::<Vec<_>>()
    .join(" ")
}

fn fingerprints_equal(current: &[SpecFingerprint], cached: &[CachedFingerprint]) -> bool {
    if current.len() != cached.len() {
        return false;
    }
    current.iter().zip(cached.iter()).all(|(a, b)| {
        a.relative_path == b.relative_path && a.size == b.size && a.mtime == b.mtime
    })
}

fn cache_path(index_path: &str) -> String {
    format!("{index_path}.meta.json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn config(spec_dir: &Path, index_path: &str) -> CatalogConfig {
        CatalogConfig {
            spec_dir: spec_dir.to_string_lossy().to_string(),
            index_path: index_path.to_string(),
            deref_mode: DerefMode::Lazy,
            semantic_enabled: false,
            embed_model: "BAAI/bge-small-en-v1.5".into(),
            execution_enabled: false,
            base_url_override: None,
            watch_enabled: false,
            watch_interval_secs: 2,
        }
    }

    fn write_pets_spec(dir: &Path) {
        fs::write(
            dir.join("pets.yaml"),
            r#"
openapi: 3.0.3
info:
  title: Pet Store
  version: "1.0.0"
paths:
  /pets:
    post:
      operationId: createPet
      requestBody:
        required: true
        content:
          application/json:
            schema:
              $ref: '#/components/schemas/NewPet'
components:
  schemas:
    NewPet:
      type: object
      required: [name, tag]
      properties:
        name:
          type: string
        tag:
          type: string
"#,
        )
        .unwrap();
    }

    #[tokio::test]
    async fn refresh_populates_catalog_and_search() {
        let dir = tempdir().unwrap();
        write_pets_spec(dir.path());
        let engine = CatalogEngine::new(config(dir.path(), ":memory:")).unwrap();
        engine.refresh(false).await.unwrap();

        let catalog = engine.get_catalog().await;
        assert_eq!(catalog["specs"][0]["specId"], "pets");
        assert_eq!(catalog["specs"][0]["operationCount"], 1);

        let matches = engine.search_operations("pets", None).await;
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].endpoint_id, "pets:createPet");
    }

    #[tokio::test]
    async fn payload_generate_and_validate_round_trip() {
        let dir = tempdir().unwrap();
        write_pets_spec(dir.path());
        let engine = CatalogEngine::new(config(dir.path(), ":memory:")).unwrap();
        engine.refresh(false).await.unwrap();

        let generated = engine.payload_generate("pets:createPet", None).await;
        assert_eq!(generated["unknownRequiredFields"], serde_json::json!(["body.name", "body.tag"]));

        let result = engine.payload_validate("pets:createPet", &generated["request"]).await;
        assert!(result.ok, "expected generated payload to validate: {:?}", result.errors);
    }

    #[tokio::test]
    async fn unknown_endpoint_yields_empty_lookups() {
        let dir = tempdir().unwrap();
        write_pets_spec(dir.path());
        let engine = CatalogEngine::new(config(dir.path(), ":memory:")).unwrap();
        engine.refresh(false).await.unwrap();

        assert_eq!(engine.endpoint_get("pets:missing", true).await, empty_object());
        let result = engine.payload_validate("pets:missing", &serde_json::json!({})).await;
        assert!(!result.ok);
        assert_eq!(result.errors[0].message, "Unknown endpointId");
    }

    #[tokio::test]
    async fn execution_disabled_by_default() {
        let dir = tempdir().unwrap();
        write_pets_spec(dir.path());
        let engine = CatalogEngine::new(config(dir.path(), ":memory:")).unwrap();
        engine.refresh(false).await.unwrap();

        let response = engine
            .execute_request("pets:createPet", &serde_json::json!({"method": "post", "path": "/pets"}), None)
            .await;
        assert!(!response.ok);
        assert!(response.error.unwrap().contains("Execution disabled"));
    }

    #[tokio::test]
    async fn cached_refresh_round_trips_catalog() {
        let dir = tempdir().unwrap();
        write_pets_spec(dir.path());
        let index_dir = tempdir().unwrap();
        let index_path = index_dir.path().join("catalog.db").to_string_lossy().to_string();

        let engine = CatalogEngine::new(config(dir.path(), &index_path)).unwrap();
        engine.refresh(false).await.unwrap();
        let before_catalog = engine.get_catalog().await;
        let before_op = engine.get_operation_by_operation_id("pets", "createPet").await;
        let before_contract = engine.endpoint_get("pets:createPet", true).await;
        let before_schema = engine.get_schema("pets", "NewPet").await;

        let engine2 = CatalogEngine::new(config(dir.path(), &index_path)).unwrap();
        engine2.refresh(true).await.unwrap();
        let after_catalog = engine2.get_catalog().await;
        let after_op = engine2.get_operation_by_operation_id("pets", "createPet").await;
        let after_contract = engine2.endpoint_get("pets:createPet", true).await;
        let after_schema = engine2.get_schema("pets", "NewPet").await;

        assert_eq!(before_catalog, after_catalog);
        assert_eq!(before_op, after_op);
        assert_eq!(before_contract, after_contract);
        assert_eq!(before_schema, after_schema);
        assert!(before_op.is_object() && !before_op.as_object().unwrap().is_empty());
        assert!(before_schema.is_object() && !before_schema.as_object().unwrap().is_empty());
    }
}
