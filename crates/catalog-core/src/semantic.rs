//! Optional semantic search over operation descriptions.
//!
//! Embeddings are produced by `fastembed` and compared by L2-normalized
//! cosine similarity. The whole subsystem is capability-gated: without the
//! `semantic` feature (or if the embedding backend fails to initialize at
//! runtime), [`SemanticIndex::available`] returns `false` and every other
//! method becomes a no-op, so the rest of the catalog keeps working with
//! lexical-only search.

/// One embeddable row: an operation's stable id and the text to embed.
pub type EmbeddingInput<'a> = (&'a str, &'a str);

/// A persisted embedding ready for storage: `(id, dimension, raw f32 bytes)`.
pub type PersistedEmbedding = (String, usize, Vec<u8>);

#[cfg(feature = "semantic")]
mod enabled {
    use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
    use ndarray::{Array1, Array2, Axis};

    use super::{EmbeddingInput, PersistedEmbedding};

    /// Embedding-backed semantic index.
    pub struct SemanticIndex {
        model_name: Option<String>,
        model: Option<TextEmbedding>,
        ids: Vec<String>,
        matrix_norm: Option<Array2<f32>>,
    }

    impl SemanticIndex {
        pub fn new(model_name: Option<String>) -> Self {
            Self {
                model_name,
                model: None,
                ids: Vec::new(),
                matrix_norm: None,
            }
        }

        /// Whether the embedding backend is loaded and usable. Lazily
        /// attempts to initialize the model on first call.
        pub fn available(&mut self) -> bool {
            self.ensure_model().is_some()
        }

        fn ensure_model(&mut self) -> Option<&TextEmbedding> {
            if self.model.is_none() {
                let options = match self.model_name.as_deref() {
                    Some(name) => InitOptions::new(resolve_model(name)),
                    None => InitOptions::new(EmbeddingModel::BGESmallENV15),
                }
                .with_show_download_progress(false);
                self.model = TextEmbedding::try_new(options).ok();
            }
            self.model.as_ref()
        }

        fn embed_texts(&mut self, texts: &[&str]) -> Vec<Vec<f32>> {
            let Some(model) = self.ensure_model() else {
                return Vec::new();
            };
            let owned: Vec<String> = texts.iter().map(|t| t.to_string()).collect();
            model.embed(owned, None).unwrap_or_default()
        }

        /// Discard the in-memory index (not the persisted embeddings).
        pub fn clear(&mut self) {
            self.ids.clear();
            self.matrix_norm = None;
        }

        /// Embed every row, build the in-memory search matrix, and return
        /// the embeddings in a form suitable for persistence.
        pub fn build(&mut self, rows: &[EmbeddingInput]) -> Vec<PersistedEmbedding> {
            if rows.is_empty() {
                self.clear();
                return Vec::new();
            }
            let ids: Vec<String> = rows.iter().map(|(id, _)| id.to_string()).collect();
            let texts: Vec<&str> = rows.iter().map(|(_, text)| *text).collect();
            let vectors = self.embed_texts(&texts);
            if vectors.is_empty() {
                self.clear();
                return Vec::new();
            }

            let matrix = stack(&vectors);
            self.ids = ids.clone();
            self.matrix_norm = Some(normalize_matrix(&matrix));

            ids.into_iter()
                .zip(vectors.into_iter())
                .map(|(id, vec)| {
                    let dim = vec.len();
                    let bytes = vec.iter().flat_map(|v| v.to_le_bytes()).collect();
                    (id, dim, bytes)
                })
                .collect()
        }

        /// Reconstruct the in-memory search matrix from persisted
        /// embeddings, discarding any row whose stored dimension no longer
        /// matches its byte length.
        pub fn load(&mut self, rows: &[(String, usize, Vec<u8>)]) {
            if rows.is_empty() {
                self.clear();
                return;
            }
            let mut ids = Vec::new();
            let mut vectors = Vec::new();
            for (id, dim, blob) in rows {
                let vec = bytes_to_vec(blob);
                if vec.len() != *dim {
                    continue;
                }
                ids.push(id.clone());
                vectors.push(vec);
            }
            if vectors.is_empty() {
                self.clear();
                return;
            }
            let matrix = stack(&vectors);
            self.ids = ids;
            self.matrix_norm = Some(normalize_matrix(&matrix));
        }

        /// Embed `query`, normalize it, and return the ids of the `top_k`
        /// nearest rows by cosine similarity, highest first (ties broken by
        /// id).
        pub fn search(&mut self, query: &str, top_k: usize) -> Vec<String> {
            let Some(matrix_norm) = self.matrix_norm.clone() else {
                return Vec::new();
            };
            let embeddings = self.embed_texts(&[query]);
            let Some(vector) = embeddings.into_iter().next() else {
                return Vec::new();
            };
            let vector = normalize_vector(&Array1::from(vector));

            let mut scored: Vec<(f32, &str)> = matrix_norm
                .axis_iter(Axis(0))
                .zip(self.ids.iter())
                .map(|(row, id)| (row.dot(&vector), id.as_str()))
                .collect();
            scored.sort_by(|a, b| {
                b.0.partial_cmp(&a.0)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| a.1.cmp(b.1))
            });
            scored
                .into_iter()
                .take(top_k)
                .map(|(_, id)| id.to_string())
                .collect()
        }
    }

    fn resolve_model(name: &str) -> EmbeddingModel {
        match name {
            "BAAI/bge-base-en-v1.5" => EmbeddingModel::BGEBaseENV15,
            "BAAI/bge-large-en-v1.5" => EmbeddingModel::BGELargeENV15,
            _ => EmbeddingModel::BGESmallENV15,
        }
    }

    fn stack(vectors: &[Vec<f32>]) -> Array2<f32> {
        let rows = vectors.len();
        let cols = vectors.first().map(|v| v.len()).unwrap_or(0);
        let flat: Vec<f32> = vectors.iter().flatten().copied().collect();
        Array2::from_shape_vec((rows, cols), flat).unwrap_or_else(|_| Array2::zeros((0, 0)))
    }

    fn normalize_vector(vector: &Array1<f32>) -> Array1<f32> {
        let norm = vector.dot(vector).sqrt();
        if norm == 0.0 {
            vector.clone()
        } else {
            vector / norm
        }
    }

    fn normalize_matrix(matrix: &Array2<f32>) -> Array2<f32> {
        let mut out = matrix.clone();
        for mut row in out.axis_iter_mut(Axis(0)) {
            let norm = row.dot(&row).sqrt();
            if norm != 0.0 {
                row /= norm;
            }
        }
        out
    }

    fn bytes_to_vec(blob: &[u8]) -> Vec<f32> {
        blob.chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect()
    }
}

#[cfg(not(feature = "semantic"))]
mod disabled {
    use super::{EmbeddingInput, PersistedEmbedding};

    /// Stand-in used when the crate is built without the `semantic`
    /// feature: every method is a no-op and `available` always reports
    /// `false`, so callers silently fall back to lexical-only search.
    pub struct SemanticIndex;

    impl SemanticIndex {
        pub fn new(_model_name: Option<String>) -> Self {
            Self
        }

        pub fn available(&mut self) -> bool {
            false
        }

        pub fn clear(&mut self) {}

        pub fn build(&mut self, _rows: &[EmbeddingInput]) -> Vec<PersistedEmbedding> {
            Vec::new()
        }

        pub fn load(&mut self, _rows: &[(String, usize, Vec<u8>)]) {}

        pub fn search(&mut self, _query: &str, _top_k: usize) -> Vec<String> {
            Vec::new()
        }
    }
}

#[cfg(feature = "semantic")]
pub use enabled::SemanticIndex;
#[cfg(not(feature = "semantic"))]
pub use disabled::SemanticIndex;
