// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prompt-context assembly for the advice generator

use anyhow::Result;
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::query::build_retriever;
use huddle::config::Config;
use huddle::output::print_json;
use huddle::format_context;

#[derive(Debug, Serialize)]
struct ContextOutput<'a> {
    query: &'a str,
    sources: Vec<&'a str>,
    context: String,
}

/// Run the context command
pub fn run(
    config: &Config,
    query: &str,
    path: Option<&str>,
    top_k: Option<usize>,
    max_chars: Option<usize>,
    format: OutputFormat,
    compact: bool,
) -> Result<()> {
    let (retriever, _) = build_retriever(config, path, max_chars)?;
    let hits = retriever.search(query, config.merge_top_k(top_k))?;
    let context = format_context(&hits);

    match format {
        OutputFormat::Json => {
            let sources = hits
                .iter()
                .map(|hit| &hit.chunk)
                .filter(|chunk| !chunk.is_sentinel())
                .map(|chunk| chunk.source.as_str())
                .collect();
            print_json(
                &ContextOutput {
                    query,
                    sources,
                    context,
                },
                compact,
            )?;
        }
        OutputFormat::Text => println!("{}", context),
    }

    Ok(())
}
