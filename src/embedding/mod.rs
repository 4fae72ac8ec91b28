// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedding module - chunking, embedding providers and the in-memory matrix
//!
//! This module turns documents into sentence-aligned chunks, embeds them via a
//! pluggable provider, and scores queries against the resulting matrix.

pub mod chunker;
pub mod matrix;
pub mod provider;

pub use chunker::{split_sentences, ChunkConfig, SentenceChunker, DEFAULT_MAX_CHARS};
pub use matrix::EmbeddingMatrix;
pub use provider::{
    create_provider, CommandProvider, DummyProvider, EmbeddingProvider, FastEmbedSettings,
    FastEmbedder, HashingProvider, DEFAULT_EMBEDDING_DIM,
};
