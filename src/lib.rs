// SPDX-License-Identifier: MIT OR Apache-2.0

//! huddle - Retrieval core for a fantasy-sports advice assistant
//!
//! Indexes a directory of plain-text notes into sentence-aligned chunks,
//! embeds them, and answers top-k cosine-similarity queries whose results
//! feed the prompt of a downstream language model.

pub mod config;
pub mod corpus;
pub mod embedding;
pub mod errors;
pub mod output;
pub mod retriever;

pub use corpus::{Chunk, EMPTY_SOURCE};
pub use errors::RetrieverError;
pub use retriever::{format_context, BuildSummary, Retriever, RetrieverConfig, SearchHit};
