// SPDX-License-Identifier: MIT OR Apache-2.0

//! Corpus discovery and chunk assembly
//!
//! Reads the plain-text documents sitting directly in one directory (no
//! recursion) and turns them into source-tagged chunks.

use ignore::WalkBuilder;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::embedding::SentenceChunker;

/// Source tag of the placeholder chunk used when a corpus is empty.
pub const EMPTY_SOURCE: &str = "EMPTY";

/// Text of the placeholder chunk used when a corpus is empty.
pub const EMPTY_PLACEHOLDER: &str = "No documents are available in the knowledge base.";

/// File extensions indexed when none are configured.
pub const DEFAULT_EXTENSIONS: &[&str] = &["txt"];

/// A span of document text tagged with the document it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chunk {
    /// Originating document identifier (the file name).
    pub source: String,
    pub text: String,
}

impl Chunk {
    pub fn new(source: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            text: text.into(),
        }
    }

    /// The single chunk an index holds when its corpus produced no chunks.
    ///
    /// Keeps the embedding matrix non-empty so queries always have a row to
    /// score against.
    pub fn empty_sentinel() -> Self {
        Self::new(EMPTY_SOURCE, EMPTY_PLACEHOLDER)
    }

    pub fn is_sentinel(&self) -> bool {
        self.source == EMPTY_SOURCE && self.text == EMPTY_PLACEHOLDER
    }
}

/// A document read from the corpus directory.
#[derive(Debug, Clone)]
pub struct Document {
    /// File name, used as the chunk source tag.
    pub name: String,
    pub content: String,
}

/// Lists and reads the text files of a single directory.
pub struct CorpusScanner {
    root: PathBuf,
    extensions: Vec<String>,
}

impl CorpusScanner {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|ext| ext.to_string()).collect(),
        }
    }

    /// Replaces the accepted extensions. Matching is case-insensitive and a
    /// leading dot is ignored.
    pub fn with_extensions<S: AsRef<str>>(mut self, extensions: &[S]) -> Self {
        self.extensions = extensions
            .iter()
            .map(|ext| ext.as_ref().trim_start_matches('.').to_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();
        self
    }

    /// Lists matching files, sorted by file name.
    ///
    /// A missing or unreadable root is logged and yields no files.
    pub fn list_files(&self) -> Vec<PathBuf> {
        if !self.root.is_dir() {
            tracing::warn!("Corpus directory {} does not exist", self.root.display());
            return Vec::new();
        }

        let walker = WalkBuilder::new(&self.root)
            .standard_filters(false)
            .hidden(true)
            .max_depth(Some(1))
            .sort_by_file_name(|a, b| a.cmp(b))
            .build();

        let mut files = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::warn!("Skipping corpus entry: {}", err);
                    continue;
                }
            };

            let path = entry.path();
            if entry.depth() == 0 || !path.is_file() {
                continue;
            }

            if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
                if self.extensions.contains(&ext.to_lowercase()) {
                    files.push(path.to_path_buf());
                }
            }
        }

        files
    }

    /// Reads every matching file.
    ///
    /// Invalid UTF-8 is replaced rather than rejected. Files that cannot be
    /// read are logged and skipped.
    pub fn scan(&self) -> Vec<Document> {
        self.list_files()
            .into_iter()
            .filter_map(|path| match fs::read(&path) {
                Ok(bytes) => {
                    let name = path
                        .file_name()
                        .map(|name| name.to_string_lossy().into_owned())
                        .unwrap_or_else(|| path.display().to_string());
                    let content = String::from_utf8_lossy(&bytes).into_owned();
                    Some(Document { name, content })
                }
                Err(err) => {
                    tracing::warn!("Skipping unreadable file {}: {}", path.display(), err);
                    None
                }
            })
            .collect()
    }
}

/// Chunks documents in order, tagging each chunk with its document name.
pub fn chunk_documents(documents: &[Document], chunker: &SentenceChunker) -> Vec<Chunk> {
    documents
        .iter()
        .flat_map(|doc| {
            chunker
                .chunk_text(&doc.content)
                .into_iter()
                .map(move |text| Chunk::new(doc.name.clone(), text))
        })
        .collect()
}
