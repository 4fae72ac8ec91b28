//! Output and color utilities for consistent terminal formatting
//!
//! Provides shared color functions respecting NO_COLOR environment variable.

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

/// Check if colors should be used (respects NO_COLOR env var)
pub fn use_colors() -> bool {
    std::env::var("NO_COLOR").is_err()
}

/// Colorize chunk source (cyan)
pub fn colorize_source(text: &str, use_color: bool) -> String {
    if use_color {
        text.cyan().to_string()
    } else {
        text.to_string()
    }
}

/// Colorize similarity score (yellow), fixed to three decimals
pub fn colorize_score(score: f32, use_color: bool) -> String {
    let formatted = format!("{:.3}", score);
    if use_color {
        formatted.yellow().to_string()
    } else {
        formatted
    }
}

/// Colorize result rank (bold)
pub fn colorize_rank(rank: usize, use_color: bool) -> String {
    let formatted = format!("#{}", rank);
    if use_color {
        formatted.bold().to_string()
    } else {
        formatted
    }
}

/// Colorize secondary text such as summaries (dimmed)
pub fn colorize_dimmed(text: &str, use_color: bool) -> String {
    if use_color {
        text.dimmed().to_string()
    } else {
        text.to_string()
    }
}

/// Print a value as JSON on stdout (pretty unless `compact`)
pub fn print_json<T: Serialize + ?Sized>(value: &T, compact: bool) -> Result<()> {
    let rendered = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    println!("{}", rendered);
    Ok(())
}
