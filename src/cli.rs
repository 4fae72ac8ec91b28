// SPDX-License-Identifier: MIT OR Apache-2.0

//! CLI argument parsing using clap

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// huddle - Retrieval core for fantasy-sports advice
///
/// Indexes a directory of plain-text notes (news, injury reports, matchup
/// write-ups) and retrieves the passages most relevant to a question.
#[derive(Parser, Debug)]
#[command(name = "huddle")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true)]
    pub format: Option<OutputFormat>,

    /// Compact JSON output (no pretty formatting)
    #[arg(long, global = true)]
    pub compact: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for results
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Index a directory and print the chunks most similar to a query
    #[command(visible_alias = "s")]
    Search {
        /// Question or keywords to look up
        query: String,

        /// Directory of documents to index (defaults to current directory)
        #[arg(short, long)]
        path: Option<String>,

        /// Number of results to return
        #[arg(short = 'k', long = "top-k")]
        top_k: Option<usize>,

        /// Soft cap on chunk length in characters
        #[arg(long)]
        max_chars: Option<usize>,
    },

    /// Index a directory and print retrieved passages as prompt context
    Context {
        /// Question the context is gathered for
        query: String,

        /// Directory of documents to index (defaults to current directory)
        #[arg(short, long)]
        path: Option<String>,

        /// Number of passages to include
        #[arg(short = 'k', long = "top-k")]
        top_k: Option<usize>,

        /// Soft cap on chunk length in characters
        #[arg(long)]
        max_chars: Option<usize>,
    },

    /// Split a single file into chunks without embedding it
    Chunk {
        /// File to chunk
        file: String,

        /// Soft cap on chunk length in characters
        #[arg(long)]
        max_chars: Option<usize>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
