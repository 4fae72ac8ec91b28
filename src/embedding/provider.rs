// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedding provider interface and implementations.
//!
//! The retriever only needs a batch `texts -> vectors` call. The builtin
//! provider runs a local fastembed model; the command provider shells out to
//! any external embedder speaking JSON; the hashing provider is a
//! deterministic offline fallback.
//!
//! Providers take `&self` and are shared between a build and concurrent
//! queries, so any per-call state lives behind the provider's own locks.

use anyhow::{bail, Context, Result};
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use serde::Deserialize;
use std::io::Write;
use std::process::{Command, Stdio};
use std::sync::{Mutex, PoisonError};

use crate::config::{EmbeddingConfig, EmbeddingProviderType};

/// Embedding width used by the hashing and dummy providers unless configured.
/// Matches all-MiniLM-L6-v2.
pub const DEFAULT_EMBEDDING_DIM: usize = 384;

/// Trait for embedding providers.
pub trait EmbeddingProvider: Send + Sync {
    /// Returns the model identifier.
    fn model_id(&self) -> &str;

    /// Generates embeddings for the given texts, one row per input.
    fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Generates an embedding for a single text.
    fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        let mut result = self.embed_texts(&[text.to_string()])?;
        result
            .pop()
            .ok_or_else(|| anyhow::anyhow!("No embedding returned"))
    }
}

/// Builds the provider selected by the `[embeddings]` config section.
pub fn create_provider(config: &EmbeddingConfig) -> Result<Box<dyn EmbeddingProvider>> {
    let provider: Box<dyn EmbeddingProvider> = match config.provider() {
        EmbeddingProviderType::Builtin => {
            Box::new(FastEmbedder::new(FastEmbedSettings::from_config(config)?)?)
        }
        EmbeddingProviderType::Command => Box::new(CommandProvider::new(
            config.command().to_string(),
            config.model().to_string(),
        )),
        EmbeddingProviderType::Hashing => Box::new(HashingProvider::new(config.dimension())),
        EmbeddingProviderType::Dummy => Box::new(DummyProvider::new(config.dimension())),
    };
    tracing::debug!("Using embedding provider {}", provider.model_id());
    Ok(provider)
}

/// Model selection and limits for [`FastEmbedder`].
#[derive(Debug, Clone)]
pub struct FastEmbedSettings {
    pub model: EmbeddingModel,
    /// Texts per forward pass. The model lock is released between passes.
    pub batch_size: usize,
    /// Inputs longer than this many characters are cut before embedding.
    pub max_input_chars: usize,
}

impl FastEmbedSettings {
    pub fn from_config(config: &EmbeddingConfig) -> Result<Self> {
        Ok(Self {
            model: parse_model_name(config.model.as_deref())?,
            batch_size: config.batch_size(),
            max_input_chars: config.max_input_chars(),
        })
    }
}

fn parse_model_name(name: Option<&str>) -> Result<EmbeddingModel> {
    let name = name.map(str::trim).unwrap_or_default().to_lowercase();
    match name.as_str() {
        "" | "minilm" | "all-minilm-l6-v2" | "sentence-transformers/all-minilm-l6-v2" => {
            Ok(EmbeddingModel::AllMiniLML6V2)
        }
        "bge-small" | "bge-small-en-v1.5" | "baai/bge-small-en-v1.5" => {
            Ok(EmbeddingModel::BGESmallENV15)
        }
        other => bail!(
            "Unsupported builtin embedding model '{}'. Supported: minilm, bge-small",
            other
        ),
    }
}

/// Local fastembed model.
///
/// The ONNX session needs exclusive access, so passes are serialized on an
/// internal lock. A corpus batch is split into `batch_size` passes and the
/// lock is taken per pass, letting query embeds run between passes.
pub struct FastEmbedder {
    model: Mutex<TextEmbedding>,
    settings: FastEmbedSettings,
    model_id: String,
}

impl FastEmbedder {
    pub fn new(settings: FastEmbedSettings) -> Result<Self> {
        let model_id = settings.model.to_string();
        let model = TextEmbedding::try_new(InitOptions::new(settings.model.clone()))
            .with_context(|| format!("Failed to load embedding model {}", model_id))?;

        Ok(Self {
            model: Mutex::new(model),
            settings,
            model_id,
        })
    }
}

impl EmbeddingProvider for FastEmbedder {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let limit = self.settings.max_input_chars;
        let clipped = texts.iter().filter(|text| text.chars().count() > limit).count();
        if clipped > 0 {
            tracing::warn!(
                clipped,
                limit,
                "Truncating texts longer than the embedding input limit"
            );
        }

        let inputs: Vec<&str> = texts.iter().map(|text| clip_chars(text, limit)).collect();
        let mut embeddings = Vec::with_capacity(inputs.len());
        for pass in inputs.chunks(self.settings.batch_size.max(1)) {
            let mut model = self.model.lock().unwrap_or_else(PoisonError::into_inner);
            embeddings.extend(model.embed(pass, None)?);
        }

        for embedding in embeddings.iter_mut() {
            l2_normalize(embedding);
        }
        Ok(embeddings)
    }
}

/// Command provider that shells out to an external process.
///
/// The command receives `{"model": ..., "texts": [...]}` on stdin and must
/// print either a JSON array of vectors or an object holding one under
/// `embeddings`, `vectors` or `data`.
pub struct CommandProvider {
    command: String,
    model: String,
}

impl CommandProvider {
    pub fn new(command: String, model: String) -> Self {
        Self { command, model }
    }

    /// Runs the command once with `request` on stdin and returns its stdout.
    fn run(&self, request: &[u8]) -> Result<Vec<u8>> {
        let mut child = Command::new("sh")
            .args(["-c", self.command.as_str()])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("Failed to spawn embedding command: {}", self.command))?;

        child
            .stdin
            .take()
            .context("Embedding command has no stdin")?
            .write_all(request)
            .context("Failed to send texts to embedding command")?;

        let output = child
            .wait_with_output()
            .context("Failed to read embedding command output")?;
        if !output.status.success() {
            bail!(
                "Embedding command failed (status {}): {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(output.stdout)
    }
}

impl EmbeddingProvider for CommandProvider {
    fn model_id(&self) -> &str {
        &self.model
    }

    fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let request = serde_json::to_vec(&serde_json::json!({
            "model": self.model,
            "texts": texts,
        }))?;
        let stdout = self.run(&request)?;

        let mut vectors = parse_command_output(&String::from_utf8_lossy(&stdout))?;
        vectors.iter_mut().for_each(|vector| l2_normalize(vector));
        Ok(vectors)
    }
}

/// Shapes an embedding command may print.
#[derive(Deserialize)]
#[serde(untagged)]
enum CommandOutput {
    Rows(Vec<Vec<f32>>),
    Keyed {
        #[serde(alias = "vectors", alias = "data")]
        embeddings: Vec<Vec<f32>>,
    },
}

fn parse_command_output(raw: &str) -> Result<Vec<Vec<f32>>> {
    let parsed: CommandOutput = serde_json::from_str(raw.trim()).context(
        "Embedding command must print a JSON array of vectors or an object with 'embeddings'",
    )?;
    Ok(match parsed {
        CommandOutput::Rows(rows) | CommandOutput::Keyed { embeddings: rows } => rows,
    })
}

/// Feature-hashing provider.
///
/// Each lowercased alphanumeric token is hashed with blake3 into one of
/// `dimension` signed buckets; the bucket counts are then L2-normalized.
/// Texts sharing vocabulary score high, identical texts score 1.0. Needs no
/// model download, so it backs offline runs and tests.
pub struct HashingProvider {
    dimension: usize,
}

impl HashingProvider {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0_f32; self.dimension];

        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|token| !token.is_empty())
        {
            let hash = blake3::hash(token.to_lowercase().as_bytes());
            let bytes = hash.as_bytes();

            let mut word = [0_u8; 8];
            word.copy_from_slice(&bytes[..8]);
            let bucket = (u64::from_le_bytes(word) % self.dimension as u64) as usize;
            let sign = if bytes[8] & 1 == 0 { 1.0 } else { -1.0 };

            vector[bucket] += sign;
        }

        l2_normalize(&mut vector);
        vector
    }
}

impl EmbeddingProvider for HashingProvider {
    fn model_id(&self) -> &str {
        "hashing"
    }

    fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.embed_text(text)).collect())
    }
}

/// Zero vectors of a fixed width. Every chunk ties, so rankings fall back to
/// corpus order.
pub struct DummyProvider {
    dimension: usize,
}

impl DummyProvider {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

impl EmbeddingProvider for DummyProvider {
    fn model_id(&self) -> &str {
        "dummy"
    }

    fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(vec![vec![0.0; self.dimension]; texts.len()])
    }
}

/// Longest prefix of `text` holding at most `max_chars` characters.
fn clip_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

/// Scales `vector` to unit L2 norm in place. Zero vectors are left as-is.
pub fn l2_normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm == 0.0 {
        return;
    }
    for value in vector.iter_mut() {
        *value /= norm;
    }
}
