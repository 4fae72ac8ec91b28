// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query module - retrieval and chunking commands

pub mod chunk;
pub mod context;
pub mod search;

use anyhow::{Context as _, Result};
use std::path::PathBuf;

use huddle::config::Config;
use huddle::embedding::create_provider;
use huddle::{BuildSummary, Retriever, RetrieverConfig};

/// Builds a retriever from config and indexes `path` (or the current directory).
pub(crate) fn build_retriever(
    config: &Config,
    path: Option<&str>,
    max_chars: Option<usize>,
) -> Result<(Retriever, BuildSummary)> {
    let root = match path {
        Some(path) => PathBuf::from(path),
        None => std::env::current_dir()?,
    };

    let mut retriever_config = RetrieverConfig::from_config(config);
    if let Some(max_chars) = max_chars {
        retriever_config = retriever_config.with_max_chars(max_chars);
    }

    let provider = create_provider(config.embeddings())
        .context("Failed to initialize embedding provider")?;
    let retriever = Retriever::new(provider, retriever_config)?;
    let summary = retriever
        .build(&root)
        .with_context(|| format!("Failed to index {}", root.display()))?;

    Ok((retriever, summary))
}
