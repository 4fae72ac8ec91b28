// SPDX-License-Identifier: MIT OR Apache-2.0

//! Show how a single document is chunked

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;

use crate::cli::OutputFormat;
use huddle::config::Config;
use huddle::embedding::{ChunkConfig, SentenceChunker};
use huddle::output::{colorize_dimmed, colorize_rank, print_json, use_colors};

#[derive(Debug, Serialize)]
struct ChunkOutput {
    index: usize,
    chars: usize,
    text: String,
}

/// Run the chunk command
pub fn run(
    config: &Config,
    file: &str,
    max_chars: Option<usize>,
    format: OutputFormat,
    compact: bool,
) -> Result<()> {
    let path = Path::new(file);
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", file))?;
    let content = String::from_utf8_lossy(&bytes);

    let max_chars = max_chars.unwrap_or_else(|| config.index().max_chars());
    let chunker = SentenceChunker::new(ChunkConfig::new(max_chars)?);
    let chunks: Vec<ChunkOutput> = chunker
        .chunk_text(&content)
        .into_iter()
        .enumerate()
        .map(|(index, text)| ChunkOutput {
            index,
            chars: text.chars().count(),
            text,
        })
        .collect();

    match format {
        OutputFormat::Json => print_json(&chunks, compact)?,
        OutputFormat::Text => {
            let use_color = use_colors();
            for chunk in &chunks {
                println!(
                    "{} {}",
                    colorize_rank(chunk.index + 1, use_color),
                    colorize_dimmed(&format!("({} chars)", chunk.chars), use_color)
                );
                println!("    {}", chunk.text);
            }
        }
    }

    Ok(())
}
