//! SQLite-backed lexical index: FTS5 full-text search plus row storage for
//! operations, schemas, and persisted embeddings.

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, OptionalExtension};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::model::{Operation, Schema};

const SCHEMA_SQL: &str = r#"
DROP TABLE IF EXISTS operations;
DROP TABLE IF EXISTS schemas;
DROP TABLE IF EXISTS ops_fts;
DROP TABLE IF EXISTS schemas_fts;
DROP TABLE IF EXISTS op_embeddings;

CREATE TABLE operations (
    id TEXT PRIMARY KEY,
    spec_id TEXT NOT NULL,
    operation_id TEXT,
    method TEXT NOT NULL,
    path TEXT NOT NULL,
    summary TEXT,
    description TEXT,
    tags TEXT,
    data TEXT NOT NULL
);

CREATE TABLE schemas (
    id TEXT PRIMARY KEY,
    spec_id TEXT NOT NULL,
    schema_name TEXT NOT NULL,
    description TEXT,
    data TEXT NOT NULL
);

CREATE INDEX operations_spec_id ON operations(spec_id);
CREATE INDEX operations_opid ON operations(spec_id, operation_id);
CREATE INDEX operations_path_method ON operations(spec_id, path, method);
CREATE INDEX schemas_spec_id ON schemas(spec_id);
CREATE INDEX schemas_name ON schemas(spec_id, schema_name);

CREATE VIRTUAL TABLE ops_fts USING fts5(
    id UNINDEXED,
    spec_id UNINDEXED,
    operation_id,
    method,
    path,
    summary,
    description,
    tags,
    content
);

CREATE VIRTUAL TABLE schemas_fts USING fts5(
    id UNINDEXED,
    spec_id UNINDEXED,
    schema_name,
    description,
    content
);

CREATE TABLE op_embeddings (
    id TEXT PRIMARY KEY,
    dim INTEGER NOT NULL,
    vector BLOB NOT NULL
);
"#;

/// A full operation row, as stored (method, path, parsed operation body).
#[derive(Debug, Clone, serde::Serialize)]
pub struct OperationRecord {
    pub spec_id: String,
    pub operation_id: Option<String>,
    pub method: String,
    pub path: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub operation: Value,
}

/// A search-result projection of an operation row (no full operation body).
#[derive(Debug, Clone, serde::Serialize)]
pub struct OperationMatch {
    #[serde(rename = "endpointId")]
    pub endpoint_id: String,
    #[serde(rename = "specId")]
    pub spec_id: String,
    #[serde(rename = "operationId")]
    pub operation_id: Option<String>,
    pub method: String,
    pub path: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub score: Option<f64>,
    #[serde(rename = "matchSnippet")]
    pub match_snippet: Option<String>,
}

/// A full schema row.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SchemaRecord {
    pub spec_id: String,
    pub schema_name: String,
    pub description: Option<String>,
    pub schema: Value,
}

/// A search-result projection of a schema row.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SchemaMatch {
    #[serde(rename = "specId")]
    pub spec_id: String,
    #[serde(rename = "schemaName")]
    pub schema_name: String,
    pub description: Option<String>,
}

impl From<OperationRecord> for Operation {
    fn from(record: OperationRecord) -> Self {
        Operation {
            spec_id: record.spec_id,
            operation_id: record.operation_id,
            method: record.method,
            path: record.path,
            summary: record.summary,
            description: record.description,
            tags: record.tags,
            operation: record.operation,
        }
    }
}

/// A persisted operation embedding: `(op_key, dimension, raw f32 bytes)`.
pub type EmbeddingRow = (String, usize, Vec<u8>);

/// The lexical/storage half of the catalog: a pooled SQLite connection plus
/// the FTS5 virtual tables that back `search_operations`/`search_schemas`.
pub struct CatalogIndex {
    pool: Pool<SqliteConnectionManager>,
}

impl CatalogIndex {
    /// Open (or create) the index at `path`. `:memory:` is supported; in
    /// that case the pool is capped at one connection so the in-memory
    /// database's contents survive across calls.
    pub fn open(path: &str) -> Result<Self> {
        let manager = if path == ":memory:" {
            SqliteConnectionManager::memory()
        } else {
            SqliteConnectionManager::file(path)
        };
        let max_size = if path == ":memory:" { 1 } else { 8 };
        let pool = Pool::builder()
            .max_size(max_size)
            .build(manager)
            .map_err(Error::Pool)?;
        {
            let conn = pool.get().map_err(Error::Pool)?;
            conn.pragma_update(None, "journal_mode", "WAL").ok();
            conn.pragma_update(None, "synchronous", "NORMAL").ok();
        }
        Ok(Self { pool })
    }

    fn conn(&self) -> Result<r2d2::PooledConnection<SqliteConnectionManager>> {
        self.pool.get().map_err(Error::Pool)
    }

    /// Drop and recreate every table. Called at the start of a full rebuild.
    pub fn reset(&self) -> Result<()> {
        let conn = self.conn()?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(())
    }

    /// True once the `operations` table exists (a cache hint survived a
    /// process restart against a file-backed index).
    pub fn is_ready(&self) -> Result<bool> {
        let conn = self.conn()?;
        let exists: Option<String> = conn
            .query_row(
                "SELECT name FROM sqlite_master WHERE type='table' AND name='operations'",
                [],
                |row| row.get(0),
            )
            .optional()?;
        Ok(exists.is_some())
    }

    /// Insert operation rows into both the row table and the FTS table.
    pub fn add_operations(&self, operations: &[Operation]) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        for op in operations {
            let tags = op.tags.join(" ");
            let op_json = serde_json::to_string(&crate::model::canonicalize(&op.operation))?;
            tx.execute(
                "INSERT INTO operations
                 (id, spec_id, operation_id, method, path, summary, description, tags, data)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    op.op_key(),
                    op.spec_id,
                    op.operation_id,
                    op.method,
                    op.path,
                    op.summary,
                    op.description,
                    tags,
                    op_json,
                ],
            )?;
            let content = [
                op.operation_id.as_deref(),
                Some(op.method.as_str()),
                Some(op.path.as_str()),
                op.summary.as_deref(),
                op.description.as_deref(),
                Some(tags.as_str()),
            ]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
            tx.execute(
                "INSERT INTO ops_fts
                 (id, spec_id, operation_id, method, path, summary, description, tags, content)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    op.op_key(),
                    op.spec_id,
                    op.operation_id,
                    op.method,
                    op.path,
                    op.summary,
                    op.description,
                    tags,
                    content,
                ],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Insert schema rows into both the row table and the FTS table.
    pub fn add_schemas(&self, schemas: &[Schema]) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        for schema in schemas {
            let schema_json = serde_json::to_string(&crate::model::canonicalize(&schema.schema))?;
            tx.execute(
                "INSERT INTO schemas (id, spec_id, schema_name, description, data)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    schema.schema_key(),
                    schema.spec_id,
                    schema.schema_name,
                    schema.description,
                    schema_json,
                ],
            )?;
            let content = [schema.schema_name.as_str(), schema.description.as_deref().unwrap_or("")]
                .into_iter()
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(" ");
            tx.execute(
                "INSERT INTO schemas_fts (id, spec_id, schema_name, description, content)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    schema.schema_key(),
                    schema.spec_id,
                    schema.schema_name,
                    schema.description,
                    content,
                ],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    /// BM25-ranked lexical search over operations, optionally restricted to
    /// one `spec_id`.
    pub fn search_operations(
        &self,
        query: &str,
        spec_id: Option<&str>,
        limit: usize,
    ) -> Result<Vec<OperationMatch>> {
        let sanitized = sanitize_fts_query(query);
        if sanitized.is_empty() {
            return Ok(Vec::new());
        }
        let conn = self.conn()?;
        let mut sql = String::from(
            "SELECT id, spec_id, operation_id, method, path, summary, description, tags, \
             bm25(ops_fts) AS score, \
             snippet(ops_fts, 8, '[', ']', '...', 12) AS snippet \
             FROM ops_fts WHERE ops_fts MATCH ?1",
        );
        if spec_id.is_some() {
            sql.push_str(" AND spec_id = ?2");
        }
        sql.push_str(&format!(
            " ORDER BY bm25(ops_fts), spec_id, path, method, operation_id LIMIT {}",
            limit
        ));

        let mut stmt = conn.prepare(&sql)?;
        let rows = if let Some(sid) = spec_id {
            stmt.query_map(params![sanitized, sid], row_to_operation_match)?
                .collect::<std::result::Result<Vec<_>, _>>()?
        } else {
            stmt.query_map(params![sanitized], row_to_operation_match)?
                .collect::<std::result::Result<Vec<_>, _>>()?
        };
        Ok(rows)
    }

    /// BM25-ranked lexical search over schemas, optionally restricted to one
    /// `spec_id`.
    pub fn search_schemas(
        &self,
        query: &str,
        spec_id: Option<&str>,
        limit: usize,
    ) -> Result<Vec<SchemaMatch>> {
        let sanitized = sanitize_fts_query(query);
        if sanitized.is_empty() {
            return Ok(Vec::new());
        }
        let conn = self.conn()?;
        let mut sql = String::from(
            "SELECT id, spec_id, schema_name, description FROM schemas_fts WHERE schemas_fts MATCH ?1",
        );
        if spec_id.is_some() {
            sql.push_str(" AND spec_id = ?2");
        }
        sql.push_str(&format!(
            " ORDER BY bm25(schemas_fts), spec_id, schema_name LIMIT {}",
            limit.max(0)
        ));

        let mut stmt = conn.prepare(&sql)?;
        let to_match = |row: &rusqlite::Row| -> rusqlite::Result<SchemaMatch> {
            Ok(SchemaMatch {
                spec_id: row.get("spec_id")?,
                schema_name: row.get("schema_name")?,
                description: row.get("description")?,
            })
        };
        let rows = if let Some(sid) = spec_id {
            stmt.query_map(params![sanitized, sid], to_match)?
                .collect::<std::result::Result<Vec<_>, _>>()?
        } else {
            stmt.query_map(params![sanitized], to_match)?
                .collect::<std::result::Result<Vec<_>, _>>()?
        };
        Ok(rows)
    }

    pub fn get_operation_by_operation_id(
        &self,
        spec_id: &str,
        operation_id: &str,
    ) -> Result<Option<OperationRecord>> {
        let conn = self.conn()?;
        conn.query_row(
            "SELECT spec_id, operation_id, method, path, summary, description, tags, data
             FROM operations WHERE spec_id = ?1 AND operation_id = ?2",
            params![spec_id, operation_id],
            row_to_operation_record,
        )
        .optional()
        .map_err(Error::from)
    }

    pub fn get_operation_by_path_method(
        &self,
        spec_id: &str,
        path: &str,
        method: &str,
    ) -> Result<Option<OperationRecord>> {
        let conn = self.conn()?;
        conn.query_row(
            "SELECT spec_id, operation_id, method, path, summary, description, tags, data
             FROM operations WHERE spec_id = ?1 AND path = ?2 AND method = ?3",
            params![spec_id, path, method],
            row_to_operation_record,
        )
        .optional()
        .map_err(Error::from)
    }

    pub fn get_operation_by_endpoint_id(&self, endpoint_id: &str) -> Result<Option<OperationRecord>> {
        let conn = self.conn()?;
        conn.query_row(
            "SELECT spec_id, operation_id, method, path, summary, description, tags, data
             FROM operations WHERE id = ?1",
            params![endpoint_id],
            row_to_operation_record,
        )
        .optional()
        .map_err(Error::from)
    }

    pub fn get_operation_match_by_id(&self, endpoint_id: &str) -> Result<Option<OperationMatch>> {
        let conn = self.conn()?;
        conn.query_row(
            "SELECT id, spec_id, operation_id, method, path, summary, description, tags
             FROM operations WHERE id = ?1",
            params![endpoint_id],
            |row| {
                let tags_raw: Option<String> = row.get("tags")?;
                Ok(OperationMatch {
                    endpoint_id: row.get("id")?,
                    spec_id: row.get("spec_id")?,
                    operation_id: row.get("operation_id")?,
                    method: row.get("method")?,
                    path: row.get("path")?,
                    summary: row.get("summary")?,
                    description: row.get("description")?,
                    tags: split_tags(tags_raw),
                    score: None,
                    match_snippet: None,
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    pub fn get_schema(&self, spec_id: &str, schema_name: &str) -> Result<Option<SchemaRecord>> {
        let conn = self.conn()?;
        conn.query_row(
            "SELECT spec_id, schema_name, description, data FROM schemas
             WHERE spec_id = ?1 AND schema_name = ?2",
            params![spec_id, schema_name],
            |row| {
                let data: String = row.get("data")?;
                Ok(SchemaRecord {
                    spec_id: row.get("spec_id")?,
                    schema_name: row.get("schema_name")?,
                    description: row.get("description")?,
                    schema: serde_json::from_str(&data).unwrap_or(Value::Null),
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    /// Persist operation embeddings (insert-or-replace by id).
    pub fn add_operation_embeddings(&self, embeddings: &[EmbeddingRow]) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        for (id, dim, vector) in embeddings {
            tx.execute(
                "INSERT OR REPLACE INTO op_embeddings (id, dim, vector) VALUES (?1, ?2, ?3)",
                params![id, *dim as i64, vector],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Load every persisted operation embedding, ordered by id.
    pub fn load_operation_embeddings(&self) -> Result<Vec<EmbeddingRow>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT id, dim, vector FROM op_embeddings ORDER BY id")?;
        let rows = stmt
            .query_map([], |row| {
                let dim: i64 = row.get("dim")?;
                Ok((row.get::<_, String>("id")?, dim as usize, row.get::<_, Vec<u8>>("vector")?))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

fn split_tags(raw: Option<String>) -> Vec<String> {
    raw.map(|s| s.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default()
}

fn row_to_operation_match(row: &rusqlite::Row) -> rusqlite::Result<OperationMatch> {
    let tags_raw: Option<String> = row.get("tags")?;
    Ok(OperationMatch {
        endpoint_id: row.get("id")?,
        spec_id: row.get("spec_id")?,
        operation_id: row.get("operation_id")?,
        method: row.get("method")?,
        path: row.get("path")?,
        summary: row.get("summary")?,
        description: row.get("description")?,
        tags: split_tags(tags_raw),
        score: row.get("score")?,
        match_snippet: row.get("snippet")?,
    })
}

fn row_to_operation_record(row: &rusqlite::Row) -> rusqlite::Result<OperationRecord> {
    let tags_raw: Option<String> = row.get("tags")?;
    let data: String = row.get("data")?;
    Ok(OperationRecord {
        spec_id: row.get("spec_id")?,
        operation_id: row.get("operation_id")?,
        method: row.get("method")?,
        path: row.get("path")?,
        summary: row.get("summary")?,
        description: row.get("description")?,
        tags: split_tags(tags_raw),
        operation: serde_json::from_str(&data).unwrap_or(Value::Null),
    })
}

/// Strip everything but letters/digits/whitespace, collapse whitespace, and
/// wrap the result as an FTS5 phrase query. Returns an empty string if
/// nothing alphanumeric remains, signaling "no query to run".
pub fn sanitize_fts_query(query: &str) -> String {
    let cleaned: String = query
        .trim()
        .chars()
        .map(|c| if c.is_alphanumeric() || c.is_whitespace() { c } else { ' ' })
        .collect();
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        String::new()
    } else {
        format!("\"{collapsed}\"")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Operation;
    use serde_json::json;

    fn sample_operation() -> Operation {
        Operation {
            spec_id: "pets".into(),
            operation_id: Some("listPets".into()),
            method: "get".into(),
            path: "/pets".into(),
            summary: Some("List all pets".into()),
            description: Some("Returns every pet in the store".into()),
            tags: vec!["pets".into()],
            operation: json!({"operationId": "listPets"}),
        }
    }

    #[test]
    fn sanitize_fts_query_wraps_as_phrase() {
        assert_eq!(sanitize_fts_query("list pets"), "\"list pets\"");
    }

    #[test]
    fn sanitize_fts_query_strips_punctuation() {
        assert_eq!(sanitize_fts_query("list-pets!!"), "\"list pets\"");
    }

    #[test]
    fn sanitize_fts_query_empty_for_pure_punctuation() {
        assert_eq!(sanitize_fts_query("!!!"), "");
    }

    #[test]
    fn roundtrip_insert_and_search_operation() {
        let index = CatalogIndex::open(":memory:").unwrap();
        index.reset().unwrap();
        index.add_operations(&[sample_operation()]).unwrap();
        let matches = index.search_operations("pets", None, 25).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].endpoint_id, "pets:listPets");
        assert!(matches[0].match_snippet.is_some());
    }

    #[test]
    fn get_operation_by_endpoint_id_round_trips_operation_body() {
        let index = CatalogIndex::open(":memory:").unwrap();
        index.reset().unwrap();
        index.add_operations(&[sample_operation()]).unwrap();
        let record = index
            .get_operation_by_endpoint_id("pets:listPets")
            .unwrap()
            .unwrap();
        assert_eq!(record.operation["operationId"], json!("listPets"));
    }

    #[test]
    fn embeddings_round_trip() {
        let index = CatalogIndex::open(":memory:").unwrap();
        index.reset().unwrap();
        let rows: Vec<EmbeddingRow> = vec![("pets:listPets".to_string(), 3, vec![1, 2, 3, 4])];
        index.add_operation_embeddings(&rows).unwrap();
        let loaded = index.load_operation_embeddings().unwrap();
        assert_eq!(loaded, rows);
    }

    #[test]
    fn is_ready_false_before_reset() {
        let index = CatalogIndex::open(":memory:").unwrap();
        assert!(!index.is_ready().unwrap());
        index.reset().unwrap();
        assert!(index.is_ready().unwrap());
    }
}
