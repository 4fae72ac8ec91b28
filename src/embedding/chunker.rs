// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sentence-based text chunker for embedding generation.
//!
//! Text is split into sentence-like units with a best-effort heuristic (a
//! `.`, `!` or `?` followed by whitespace ends a sentence). Sentences are then
//! packed greedily into chunks of roughly `max_chars` characters. No sentence
//! is ever split across two chunks, so the cap is soft: a single sentence
//! longer than the cap becomes a chunk of its own.

use anyhow::{bail, Result};
use once_cell::sync::Lazy;
use regex::Regex;

/// Default soft cap on chunk length, in characters.
pub const DEFAULT_MAX_CHARS: usize = 1200;

static SENTENCE_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?]\s+").expect("sentence boundary regex is valid"));

/// Configuration for the sentence chunker.
#[derive(Debug, Clone)]
pub struct ChunkConfig {
    /// Soft cap on chunk length, in characters.
    pub max_chars: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            max_chars: DEFAULT_MAX_CHARS,
        }
    }
}

impl ChunkConfig {
    /// Creates a new ChunkConfig with the given soft cap.
    pub fn new(max_chars: usize) -> Result<Self> {
        if max_chars == 0 {
            bail!("max_chars must be greater than 0");
        }
        Ok(Self { max_chars })
    }
}

/// Splits text into sentence-aligned chunks.
#[derive(Debug, Clone)]
pub struct SentenceChunker {
    config: ChunkConfig,
}

impl SentenceChunker {
    /// Creates a new chunker with the given configuration.
    pub fn new(config: ChunkConfig) -> Self {
        Self { config }
    }

    /// Creates a chunker with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(ChunkConfig::default())
    }

    /// Returns the current configuration.
    pub fn config(&self) -> &ChunkConfig {
        &self.config
    }

    /// Packs the sentences of `content` into chunks.
    ///
    /// Algorithm (check-then-append):
    /// ```text
    /// for sentence in split_sentences(content):
    ///   if buffer != "" and len(buffer) + 1 + len(sentence) >= max_chars:
    ///     emit buffer; buffer = ""
    ///   buffer = join(buffer, sentence, " ")
    /// emit buffer if non-empty
    /// ```
    ///
    /// Lengths are counted in `char`s. Every emitted chunk is non-empty and
    /// already trimmed.
    pub fn chunk_text(&self, content: &str) -> Vec<String> {
        let max_chars = self.config.max_chars;
        let mut chunks = Vec::new();
        let mut buffer = String::new();
        let mut buffer_chars = 0_usize;

        for sentence in split_sentences(content) {
            let sentence_chars = sentence.chars().count();

            if !buffer.is_empty() && buffer_chars + 1 + sentence_chars >= max_chars {
                chunks.push(std::mem::take(&mut buffer));
                buffer_chars = 0;
            }

            if !buffer.is_empty() {
                buffer.push(' ');
                buffer_chars += 1;
            }
            buffer.push_str(sentence);
            buffer_chars += sentence_chars;
        }

        if !buffer.is_empty() {
            chunks.push(buffer);
        }

        chunks
    }
}

/// Splits text into trimmed, non-empty sentences.
///
/// The terminating punctuation stays with its sentence; the whitespace after
/// it is dropped. Text without any boundary comes back as one sentence.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;

    for boundary in SENTENCE_BOUNDARY.find_iter(text) {
        // The punctuation mark is ASCII, so it is exactly one byte wide.
        let end = boundary.start() + 1;
        push_trimmed(&mut sentences, &text[start..end]);
        start = boundary.end();
    }
    push_trimmed(&mut sentences, &text[start..]);

    sentences
}

fn push_trimmed<'a>(sentences: &mut Vec<&'a str>, candidate: &'a str) {
    let trimmed = candidate.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunker(max_chars: usize) -> SentenceChunker {
        SentenceChunker::new(ChunkConfig::new(max_chars).unwrap())
    }

    #[test]
    fn test_default_config() {
        let config = ChunkConfig::default();
        assert_eq!(config.max_chars, 1200);
    }

    #[test]
    fn test_config_validation() {
        assert!(ChunkConfig::new(100).is_ok());
        assert!(ChunkConfig::new(0).is_err());
    }

    #[test]
    fn test_split_sentences() {
        let sentences = split_sentences("Start him. Bench him?  Trade him!\nDone");
        assert_eq!(
            sentences,
            vec!["Start him.", "Bench him?", "Trade him!", "Done"]
        );
    }

    #[test]
    fn test_split_ignores_inner_punctuation() {
        // No whitespace after the dot, so no boundary.
        let sentences = split_sentences("He ran a 4.4 forty. Impressive.");
        assert_eq!(sentences, vec!["He ran a 4.4 forty.", "Impressive."]);
    }

    #[test]
    fn test_empty_and_blank_content() {
        let chunker = SentenceChunker::with_defaults();
        assert!(chunker.chunk_text("").is_empty());
        assert!(chunker.chunk_text("   \n\t ").is_empty());
    }

    #[test]
    fn test_short_text_is_single_chunk() {
        let text = "The QB threw deep. He was pressured. The pass fell incomplete.";
        let chunks = SentenceChunker::with_defaults().chunk_text(text);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0], text);
    }

    #[test]
    fn test_many_short_sentences_respect_soft_cap() {
        let sentence = "Kicker made the XP.";
        let mut text = String::new();
        while text.len() < 3000 {
            text.push_str(sentence);
            text.push(' ');
        }

        let chunks = chunker(100).chunk_text(&text);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 120, "chunk too long: {}", chunk);
            assert!(chunk.ends_with('.'), "chunk split mid-sentence: {}", chunk);
            assert!(chunk.starts_with("Kicker"));
        }
    }

    #[test]
    fn test_chunks_reconstruct_sentence_sequence() {
        let text = "Week one was rough. The defense gave up big plays! Can the \
                    secondary recover? Coaches think so. Injuries remain a worry. \
                    The bye week helps.";
        let sentences = split_sentences(text);
        let chunks = chunker(40).chunk_text(text);

        assert!(chunks.len() > 1);
        assert_eq!(chunks.join(" "), sentences.join(" "));
    }

    #[test]
    fn test_boundary_flushes_before_reaching_cap() {
        // "aaaa." (5) + " " + "bbbb." (5) = 11 chars.
        let text = "aaaa. bbbb.";
        assert_eq!(chunker(11).chunk_text(text), vec!["aaaa.", "bbbb."]);
        assert_eq!(chunker(12).chunk_text(text), vec!["aaaa. bbbb."]);
    }

    #[test]
    fn test_oversized_sentence_is_kept_whole() {
        let long = format!("{}.", "x".repeat(50));
        let text = format!("Short one. {} Tail.", long);

        let chunks = chunker(20).chunk_text(&text);
        assert_eq!(chunks, vec!["Short one.".to_string(), long, "Tail.".to_string()]);
    }

    #[test]
    fn test_multibyte_text_counts_chars() {
        // "Ça va. Été!" is 11 chars but 14 bytes.
        let text = "Ça va. Été! Ñu?";
        let chunks = chunker(12).chunk_text(text);
        assert_eq!(chunks, vec!["Ça va. Été!", "Ñu?"]);
    }
}
