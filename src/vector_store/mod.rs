//! Vector storage for persisted indexes.
//!
//! Each named index owns one store file; the trait keeps the index layer
//! independent of the backend.

mod sqlite;

pub use sqlite::SqliteVectorStore;

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A chunk of source text stored with its embedding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Unique chunk ID.
    pub id: Uuid,
    /// File the text came from.
    pub source: String,
    /// Page label within the file, when it has pages.
    pub label: Option<String>,
    /// Text content of this chunk.
    pub content: String,
    /// Embedding vector.
    pub embedding: Vec<f32>,
    /// Position of this chunk within the index.
    pub chunk_order: i32,
    /// When this chunk was indexed.
    pub indexed_at: DateTime<Utc>,
}

impl Chunk {
    pub fn new(
        source: String,
        label: Option<String>,
        content: String,
        embedding: Vec<f32>,
        chunk_order: i32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            source,
            label,
            content,
            embedding,
            chunk_order,
            indexed_at: Utc::now(),
        }
    }

    /// Short human-readable origin, e.g. `report.pdf p.3`.
    pub fn citation(&self) -> String {
        match &self.label {
            Some(label) => format!("{} p.{}", self.source, label),
            None => self.source.clone(),
        }
    }
}

/// A search result with score.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// The matched chunk.
    pub chunk: Chunk,
    /// Similarity score (higher is better).
    pub score: f32,
}

/// Trait for vector store implementations.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Bulk insert chunks, replacing any with the same ID.
    async fn upsert_batch(&self, chunks: &[Chunk]) -> Result<usize>;

    /// Search for the most similar chunks.
    async fn search(&self, query_embedding: &[f32], limit: usize) -> Result<Vec<SearchResult>>;

    /// Search with a minimum similarity threshold.
    async fn search_with_threshold(
        &self,
        query_embedding: &[f32],
        limit: usize,
        min_score: f32,
    ) -> Result<Vec<SearchResult>>;

    /// Get total chunk count.
    async fn document_count(&self) -> Result<usize>;
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}
