// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory semantic retriever
//!
//! [`Retriever`] owns an embedding provider and a snapshot of the indexed
//! corpus (chunks plus their embedding matrix). `build` replaces the snapshot
//! wholesale; `search` embeds a query and ranks chunks by cosine similarity.
//!
//! Builds are serialized. A search clones the current snapshot handle and
//! scores against it without waiting on a build in progress, so readers see
//! either the previous snapshot or the new one, never a half-written index.

use serde::Serialize;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Instant;

use crate::config::Config;
use crate::corpus::{chunk_documents, Chunk, CorpusScanner, DEFAULT_EXTENSIONS};
use crate::embedding::provider::l2_normalize;
use crate::embedding::{
    ChunkConfig, EmbeddingMatrix, EmbeddingProvider, SentenceChunker, DEFAULT_MAX_CHARS,
};
use crate::errors::{Result, RetrieverError};

/// Tunables for a [`Retriever`].
#[derive(Debug, Clone)]
pub struct RetrieverConfig {
    /// Soft cap on chunk length, in characters.
    pub max_chars: usize,
    /// Extensions of the files read from the corpus directory.
    pub extensions: Vec<String>,
}

impl Default for RetrieverConfig {
    fn default() -> Self {
        Self {
            max_chars: DEFAULT_MAX_CHARS,
            extensions: DEFAULT_EXTENSIONS.iter().map(|ext| ext.to_string()).collect(),
        }
    }
}

impl RetrieverConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_chars: config.index().max_chars(),
            extensions: config.index().extensions(),
        }
    }

    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars;
        self
    }
}

/// One ranked search result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    /// Cosine similarity in [-1, 1].
    pub score: f32,
    pub chunk: Chunk,
}

/// Outcome of a successful build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BuildSummary {
    /// Documents read from the corpus directory.
    pub files: usize,
    /// Chunks in the index, including the sentinel for empty corpora.
    pub chunks: usize,
    pub dimension: usize,
}

/// Chunks and their embeddings; row `i` of the matrix embeds `chunks[i]`.
struct IndexSnapshot {
    chunks: Vec<Chunk>,
    matrix: EmbeddingMatrix,
}

pub struct Retriever {
    provider: Box<dyn EmbeddingProvider>,
    chunker: SentenceChunker,
    extensions: Vec<String>,
    build_lock: Mutex<()>,
    snapshot: RwLock<Option<Arc<IndexSnapshot>>>,
}

impl Retriever {
    /// Creates an empty retriever. Call [`Retriever::build`] before searching.
    pub fn new(provider: Box<dyn EmbeddingProvider>, config: RetrieverConfig) -> anyhow::Result<Self> {
        let chunker = SentenceChunker::new(ChunkConfig::new(config.max_chars)?);
        Ok(Self {
            provider,
            chunker,
            extensions: config.extensions,
            build_lock: Mutex::new(()),
            snapshot: RwLock::new(None),
        })
    }

    pub fn model_id(&self) -> &str {
        self.provider.model_id()
    }

    /// Indexes every matching text file directly inside `source_dir`.
    ///
    /// An empty corpus is indexed as the single sentinel chunk. Unreadable
    /// files are skipped. On error the previous index stays in place.
    pub fn build(&self, source_dir: impl AsRef<Path>) -> Result<BuildSummary> {
        let source_dir = source_dir.as_ref();
        let _guard = self
            .build_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let started = Instant::now();

        let documents = CorpusScanner::new(source_dir)
            .with_extensions(&self.extensions)
            .scan();
        let mut chunks = chunk_documents(&documents, &self.chunker);
        if chunks.is_empty() {
            tracing::info!(
                "No chunks found in {}; indexing placeholder",
                source_dir.display()
            );
            chunks.push(Chunk::empty_sentinel());
        }

        let texts: Vec<String> = chunks.iter().map(|chunk| chunk.text.clone()).collect();
        let rows = self
            .provider
            .embed_texts(&texts)
            .map_err(RetrieverError::index_build)?;

        if rows.len() != chunks.len() {
            return Err(RetrieverError::index_build(anyhow::anyhow!(
                "Provider returned {} embeddings for {} chunks",
                rows.len(),
                chunks.len()
            )));
        }
        let matrix = EmbeddingMatrix::from_rows(rows).map_err(RetrieverError::index_build)?;

        let summary = BuildSummary {
            files: documents.len(),
            chunks: chunks.len(),
            dimension: matrix.dimension(),
        };
        *self
            .snapshot
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(IndexSnapshot { chunks, matrix }));

        tracing::info!(
            files = summary.files,
            chunks = summary.chunks,
            dimension = summary.dimension,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Built index from {}",
            source_dir.display()
        );
        Ok(summary)
    }

    /// Returns up to `k` chunks ranked by cosine similarity to `query`.
    ///
    /// Equal scores keep corpus order. Asking for more results than the
    /// index holds returns the whole index.
    pub fn search(&self, query: &str, k: usize) -> Result<Vec<SearchHit>> {
        if query.trim().is_empty() {
            return Err(RetrieverError::EmptyQuery);
        }
        if k == 0 {
            return Err(RetrieverError::InvalidTopK);
        }
        let snapshot = self.current().ok_or(RetrieverError::NotBuilt)?;

        let mut vector = self
            .provider
            .embed_one(query)
            .map_err(RetrieverError::query_embedding)?;

        let expected = snapshot.matrix.dimension();
        if vector.len() != expected {
            return Err(RetrieverError::EmbeddingDimensionMismatch {
                expected,
                actual: vector.len(),
            });
        }
        if vector.iter().any(|value| !value.is_finite()) {
            return Err(RetrieverError::query_embedding(anyhow::anyhow!(
                "Query embedding contains non-finite values"
            )));
        }
        l2_normalize(&mut vector);

        let hits = snapshot
            .matrix
            .top_k(&vector, k)
            .into_iter()
            .map(|(row, score)| SearchHit {
                score,
                chunk: snapshot.chunks[row].clone(),
            })
            .collect::<Vec<_>>();

        tracing::debug!("Query matched {} of {} chunks", hits.len(), snapshot.chunks.len());
        Ok(hits)
    }

    /// Retrieves the top `k` chunks and renders them as prompt context.
    pub fn context(&self, query: &str, k: usize) -> Result<String> {
        Ok(format_context(&self.search(query, k)?))
    }

    /// Copies the indexed chunks, in index order.
    pub fn chunks(&self) -> Vec<Chunk> {
        self.current()
            .map(|snapshot| snapshot.chunks.clone())
            .unwrap_or_default()
    }

    /// Number of indexed chunks (0 before the first build).
    pub fn len(&self) -> usize {
        self.current().map_or(0, |snapshot| snapshot.chunks.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Embedding width of the current index.
    pub fn dimension(&self) -> Option<usize> {
        self.current().map(|snapshot| snapshot.matrix.dimension())
    }

    /// Number of rows in the current embedding matrix.
    pub fn matrix_rows(&self) -> usize {
        self.current().map_or(0, |snapshot| snapshot.matrix.rows())
    }

    fn current(&self) -> Option<Arc<IndexSnapshot>> {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Renders hits as `[source] text` blocks separated by blank lines.
pub fn format_context(hits: &[SearchHit]) -> String {
    hits.iter()
        .map(|hit| format!("[{}] {}", hit.chunk.source, hit.chunk.text))
        .collect::<Vec<_>>()
        .join("\n\n")
}
