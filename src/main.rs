// SPDX-License-Identifier: MIT OR Apache-2.0

//! huddle - Retrieval core for fantasy-sports advice
//!
//! Builds an in-memory semantic index over a directory of notes and
//! retrieves the passages that ground the assistant's answers.

mod cli;
mod query;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Commands, OutputFormat};
use huddle::config::{Config, ConfigOutputFormat};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Initialize tracing with HUDDLE_LOG env var (e.g., HUDDLE_LOG=debug huddle search "query")
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_env("HUDDLE_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load();
    let format = cli.format.unwrap_or(match config.output_format() {
        Some(ConfigOutputFormat::Json) => OutputFormat::Json,
        _ => OutputFormat::Text,
    });
    let compact = cli.compact;

    match cli.command {
        Commands::Search {
            query,
            path,
            top_k,
            max_chars,
        } => {
            query::search::run(
                &config,
                &query,
                path.as_deref(),
                top_k,
                max_chars,
                format,
                compact,
            )?;
        }
        Commands::Context {
            query,
            path,
            top_k,
            max_chars,
        } => {
            query::context::run(
                &config,
                &query,
                path.as_deref(),
                top_k,
                max_chars,
                format,
                compact,
            )?;
        }
        Commands::Chunk { file, max_chars } => {
            query::chunk::run(&config, &file, max_chars, format, compact)?;
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "huddle", &mut std::io::stdout());
        }
    }

    Ok(())
}
