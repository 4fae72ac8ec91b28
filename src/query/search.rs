// SPDX-License-Identifier: MIT OR Apache-2.0

//! Semantic search over an indexed directory

use anyhow::Result;
use serde::Serialize;
use std::time::Instant;

use crate::cli::OutputFormat;
use crate::query::build_retriever;
use huddle::config::Config;
use huddle::output::{
    colorize_dimmed, colorize_rank, colorize_score, colorize_source, print_json, use_colors,
};
use huddle::{BuildSummary, SearchHit};

/// Search result for JSON output
#[derive(Debug, Serialize)]
struct SearchOutput<'a> {
    query: &'a str,
    model: &'a str,
    index: BuildSummary,
    elapsed_ms: u64,
    results: &'a [SearchHit],
}

/// Run the search command
pub fn run(
    config: &Config,
    query: &str,
    path: Option<&str>,
    top_k: Option<usize>,
    max_chars: Option<usize>,
    format: OutputFormat,
    compact: bool,
) -> Result<()> {
    let started = Instant::now();
    let (retriever, summary) = build_retriever(config, path, max_chars)?;
    let hits = retriever.search(query, config.merge_top_k(top_k))?;
    let elapsed_ms = started.elapsed().as_millis() as u64;

    match format {
        OutputFormat::Json => {
            let output = SearchOutput {
                query,
                model: retriever.model_id(),
                index: summary,
                elapsed_ms,
                results: &hits,
            };
            print_json(&output, compact)?;
        }
        OutputFormat::Text => {
            let use_color = use_colors();
            for (rank, hit) in hits.iter().enumerate() {
                println!(
                    "{} {} {}",
                    colorize_rank(rank + 1, use_color),
                    colorize_score(hit.score, use_color),
                    colorize_source(&hit.chunk.source, use_color)
                );
                println!("    {}", hit.chunk.text);
            }
            println!(
                "{}",
                colorize_dimmed(
                    &format!(
                        "{} results from {} chunks in {} files ({} ms)",
                        hits.len(),
                        summary.chunks,
                        summary.files,
                        elapsed_ms
                    ),
                    use_color
                )
            );
        }
    }

    Ok(())
}
