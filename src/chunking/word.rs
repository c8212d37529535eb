//! Fixed-size word-window chunking.

use super::{ChunkingConfig, TextChunk};
use crate::source::DocumentSet;

/// Splits each document into windows of whole words with a fixed overlap.
///
/// Chunks never span two documents, so every chunk keeps the page label of
/// the page it came from.
#[derive(Debug, Clone)]
pub struct WordChunker {
    chunk_words: usize,
    overlap_words: usize,
}

impl WordChunker {
    pub fn new(config: ChunkingConfig) -> Self {
        let chunk_words = config.chunk_words.max(1);
        // Overlap must leave room to advance
        let overlap_words = config.overlap_words.min(chunk_words - 1);
        Self {
            chunk_words,
            overlap_words,
        }
    }

    pub fn config(&self) -> ChunkingConfig {
        ChunkingConfig {
            chunk_words: self.chunk_words,
            overlap_words: self.overlap_words,
        }
    }

    pub fn split(&self, documents: &DocumentSet) -> Vec<TextChunk> {
        let step = self.chunk_words - self.overlap_words;
        let mut chunks = Vec::new();
        let mut order = 0;

        for doc in documents.iter() {
            let words: Vec<&str> = doc.text.split_whitespace().collect();
            let mut start = 0;

            while start < words.len() {
                let end = (start + self.chunk_words).min(words.len());
                chunks.push(TextChunk {
                    source: doc.file_name.clone(),
                    label: doc.page_label.clone(),
                    content: words[start..end].join(" "),
                    order,
                });
                order += 1;

                if end == words.len() {
                    break;
                }
                start += step;
            }
        }

        chunks
    }
}

impl Default for WordChunker {
    fn default() -> Self {
        Self::new(ChunkingConfig::default())
    }
}
