// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration file support for huddle
//!
//! Loads configuration from .huddlerc.toml in current directory or ~/.config/huddle/config.toml

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::corpus::DEFAULT_EXTENSIONS;
use crate::embedding::{DEFAULT_EMBEDDING_DIM, DEFAULT_MAX_CHARS};

/// Name of the per-directory config file
pub const CONFIG_FILE_NAME: &str = ".huddlerc.toml";

const DEFAULT_EMBED_BATCH_SIZE: usize = 64;
const MAX_EMBED_BATCH_SIZE: usize = 1024;
const DEFAULT_MAX_INPUT_CHARS: usize = 2000;

/// Output format for results (mirrored from cli for library use)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigOutputFormat {
    #[default]
    Text,
    Json,
}

/// Embedding provider type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProviderType {
    /// Local fastembed model
    #[default]
    Builtin,
    /// External command speaking JSON over stdin/stdout
    Command,
    /// Deterministic feature hashing, no model download
    Hashing,
    /// Zero vectors
    Dummy,
}

/// Corpus indexing configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Soft cap on chunk length in characters
    pub max_chars: Option<usize>,
    /// File extensions treated as plain-text documents
    pub extensions: Option<Vec<String>>,
}

impl IndexConfig {
    /// Get max chars per chunk (defaults to 1200)
    pub fn max_chars(&self) -> usize {
        match self.max_chars {
            Some(0) | None => DEFAULT_MAX_CHARS,
            Some(value) => value,
        }
    }

    /// Get document extensions (defaults to ["txt"])
    pub fn extensions(&self) -> Vec<String> {
        match &self.extensions {
            Some(extensions) if !extensions.is_empty() => extensions.clone(),
            _ => DEFAULT_EXTENSIONS.iter().map(|ext| ext.to_string()).collect(),
        }
    }
}

/// Search configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Number of results returned when none is requested
    pub default_k: Option<usize>,
}

impl SearchConfig {
    /// Get default result count (defaults to 5)
    pub fn default_k(&self) -> usize {
        match self.default_k {
            Some(0) | None => 5,
            Some(value) => value,
        }
    }
}

/// Embedding configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Provider type (builtin, command, hashing, dummy)
    pub provider: Option<EmbeddingProviderType>,
    /// Builtin model name (minilm, bge-small) or the id passed to the command provider
    pub model: Option<String>,
    /// Command to execute for command provider
    pub command: Option<String>,
    /// Vector width for the hashing and dummy providers
    pub dimension: Option<usize>,
    /// Texts per builtin model pass
    pub batch_size: Option<usize>,
    /// Longest text, in characters, the builtin model receives
    pub max_input_chars: Option<usize>,
}

impl EmbeddingConfig {
    /// Get provider type (defaults to Builtin)
    pub fn provider(&self) -> EmbeddingProviderType {
        self.provider.unwrap_or_default()
    }

    /// Get model identifier (defaults to "local-model-id")
    pub fn model(&self) -> &str {
        self.model.as_deref().unwrap_or("local-model-id")
    }

    /// Get command (defaults to "embedder")
    pub fn command(&self) -> &str {
        self.command.as_deref().unwrap_or("embedder")
    }

    /// Get vector dimension (defaults to 384)
    pub fn dimension(&self) -> usize {
        match self.dimension {
            Some(0) | None => DEFAULT_EMBEDDING_DIM,
            Some(value) => value,
        }
    }

    /// Get builtin model batch size (defaults to 64, capped at 1024)
    pub fn batch_size(&self) -> usize {
        match self.batch_size {
            Some(0) | None => DEFAULT_EMBED_BATCH_SIZE,
            Some(value) if value > MAX_EMBED_BATCH_SIZE => {
                tracing::warn!(
                    "embeddings.batch_size={} exceeds max {}; clamping",
                    value,
                    MAX_EMBED_BATCH_SIZE
                );
                MAX_EMBED_BATCH_SIZE
            }
            Some(value) => value,
        }
    }

    /// Get builtin model input limit (defaults to 2000)
    pub fn max_input_chars(&self) -> usize {
        match self.max_input_chars {
            Some(0) | None => DEFAULT_MAX_INPUT_CHARS,
            Some(value) => value,
        }
    }
}

/// Configuration loaded from .huddlerc.toml or ~/.config/huddle/config.toml
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default output format (text or json)
    pub default_format: Option<String>,

    /// Index configuration
    #[serde(default)]
    pub index: IndexConfig,

    /// Search configuration
    #[serde(default)]
    pub search: SearchConfig,

    /// Embedding configuration
    #[serde(default)]
    pub embeddings: EmbeddingConfig,
}

impl Config {
    /// Load configuration from files
    ///
    /// Precedence (highest to lowest):
    /// 1. .huddlerc.toml in current directory
    /// 2. ~/.config/huddle/config.toml
    pub fn load() -> Self {
        // Try current directory first
        if let Some(config) = Self::load_from_path(&PathBuf::from(CONFIG_FILE_NAME)) {
            return config;
        }

        // Try home directory config
        if let Some(home) = dirs::home_dir() {
            let config_path = home.join(".config").join("huddle").join("config.toml");
            if let Some(config) = Self::load_from_path(&config_path) {
                return config;
            }
        }

        Self::default()
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    fn load_from_path(path: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        match Self::from_toml_str(&content) {
            Ok(config) => {
                tracing::debug!("Loaded config from {}", path.display());
                Some(config)
            }
            Err(e) => {
                tracing::warn!("Failed to parse {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Get output format from config, parsing the string to ConfigOutputFormat
    pub fn output_format(&self) -> Option<ConfigOutputFormat> {
        self.default_format.as_ref().and_then(|s| match s.to_lowercase().as_str() {
            "json" => Some(ConfigOutputFormat::Json),
            "text" => Some(ConfigOutputFormat::Text),
            _ => None,
        })
    }

    /// Merge CLI result count with config (CLI wins)
    pub fn merge_top_k(&self, cli_value: Option<usize>) -> usize {
        cli_value.unwrap_or_else(|| self.search.default_k())
    }

    /// Get the index configuration
    pub fn index(&self) -> &IndexConfig {
        &self.index
    }

    /// Get the search configuration
    pub fn search(&self) -> &SearchConfig {
        &self.search
    }

    /// Get the embedding configuration
    pub fn embeddings(&self) -> &EmbeddingConfig {
        &self.embeddings
    }
}
