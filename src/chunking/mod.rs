//! Splitting documents into embeddable chunks.

mod word;

pub use word::WordChunker;

use crate::config::IndexSettings;
use serde::{Deserialize, Serialize};

/// A piece of one source document, ready to embed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextChunk {
    /// File the text came from.
    pub source: String,
    /// Page label of the originating document, if any.
    pub label: Option<String>,
    /// Text content of this chunk.
    pub content: String,
    /// Order of this chunk across the whole document set.
    pub order: i32,
}

/// Configuration for chunking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkingConfig {
    /// Target chunk size in words.
    pub chunk_words: usize,
    /// Words repeated at the start of the next chunk.
    pub overlap_words: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_words: 256,
            overlap_words: 32,
        }
    }
}

impl From<&IndexSettings> for ChunkingConfig {
    fn from(settings: &IndexSettings) -> Self {
        Self {
            chunk_words: settings.chunk_words,
            overlap_words: settings.overlap_words,
        }
    }
}
