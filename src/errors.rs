// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the retrieval core

/// Result alias for retriever operations.
pub type Result<T> = std::result::Result<T, RetrieverError>;

/// Errors surfaced by [`crate::retriever::Retriever`].
///
/// Per-file read failures during corpus ingestion are not represented here:
/// they are logged and the offending file is skipped.
#[derive(Debug, thiserror::Error)]
pub enum RetrieverError {
    /// The embedding provider failed or returned a matrix that does not fit
    /// the chunk list. The previous index, if any, is left untouched.
    #[error("Index build failed: {source}")]
    IndexBuild {
        #[source]
        source: anyhow::Error,
    },

    /// The query vector does not have the same width as the stored matrix.
    #[error("Embedding dimension mismatch: index has {expected} dimensions, query has {actual}")]
    EmbeddingDimensionMismatch { expected: usize, actual: usize },

    /// The provider failed while embedding a query.
    #[error("Query embedding failed: {source}")]
    QueryEmbedding {
        #[source]
        source: anyhow::Error,
    },

    #[error("Query must not be empty")]
    EmptyQuery,

    #[error("Requested result count must be at least 1")]
    InvalidTopK,

    /// `search` was called before any successful `build`.
    #[error("Index has not been built yet")]
    NotBuilt,
}

impl RetrieverError {
    pub fn index_build(source: impl Into<anyhow::Error>) -> Self {
        Self::IndexBuild {
            source: source.into(),
        }
    }

    pub fn query_embedding(source: impl Into<anyhow::Error>) -> Self {
        Self::QueryEmbedding {
            source: source.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_mismatch_message() {
        let err = RetrieverError::EmbeddingDimensionMismatch {
            expected: 384,
            actual: 128,
        };
        assert_eq!(
            err.to_string(),
            "Embedding dimension mismatch: index has 384 dimensions, query has 128"
        );
    }

    #[test]
    fn test_index_build_keeps_source() {
        let err = RetrieverError::index_build(anyhow::anyhow!("provider unreachable"));
        assert!(err.to_string().contains("provider unreachable"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
