//! SQLite-backed vector store.
//!
//! Embeddings are stored as little-endian `f32` blobs and scored in Rust
//! with brute-force cosine similarity.

use super::{cosine_similarity, Chunk, SearchResult, VectorStore};
use crate::error::{DocQueryError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, instrument, warn};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS chunks (
    id TEXT PRIMARY KEY,
    source TEXT NOT NULL,
    label TEXT,
    content TEXT NOT NULL,
    embedding BLOB NOT NULL,
    chunk_order INTEGER NOT NULL,
    indexed_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_chunks_order ON chunks(chunk_order);
"#;

/// SQLite-based vector store.
pub struct SqliteVectorStore {
    conn: Mutex<Connection>,
}

impl SqliteVectorStore {
    /// Open (or create) a store file.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;

        info!("Opened SQLite vector store at {:?}", path);
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| DocQueryError::VectorStore(format!("Failed to acquire lock: {}", e)))
    }

    /// Serialize embedding to bytes.
    fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    /// Deserialize embedding from bytes.
    fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect()
    }

    fn chunk_from_row(row: &Row<'_>) -> rusqlite::Result<Chunk> {
        let id_str: String = row.get(0)?;
        let embedding_bytes: Vec<u8> = row.get(4)?;
        let indexed_at_str: String = row.get(6)?;

        Ok(Chunk {
            id: uuid::Uuid::parse_str(&id_str).unwrap_or_default(),
            source: row.get(1)?,
            label: row.get(2)?,
            content: row.get(3)?,
            embedding: Self::bytes_to_embedding(&embedding_bytes),
            chunk_order: row.get(5)?,
            indexed_at: DateTime::parse_from_rfc3339(&indexed_at_str)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
        })
    }
}

#[async_trait]
impl VectorStore for SqliteVectorStore {
    #[instrument(skip(self, chunks), fields(count = chunks.len()))]
    async fn upsert_batch(&self, chunks: &[Chunk]) -> Result<usize> {
        let conn = self.lock()?;
        let tx = conn.unchecked_transaction()?;

        for chunk in chunks {
            tx.execute(
                r#"
                INSERT OR REPLACE INTO chunks
                (id, source, label, content, embedding, chunk_order, indexed_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
                params![
                    chunk.id.to_string(),
                    chunk.source,
                    chunk.label,
                    chunk.content,
                    Self::embedding_to_bytes(&chunk.embedding),
                    chunk.chunk_order,
                    chunk.indexed_at.to_rfc3339(),
                ],
            )?;
        }

        tx.commit()?;
        debug!("Batch upserted {} chunks", chunks.len());
        Ok(chunks.len())
    }

    async fn search(&self, query_embedding: &[f32], limit: usize) -> Result<Vec<SearchResult>> {
        self.search_with_threshold(query_embedding, limit, f32::MIN).await
    }

    #[instrument(skip(self, query_embedding))]
    async fn search_with_threshold(
        &self,
        query_embedding: &[f32],
        limit: usize,
        min_score: f32,
    ) -> Result<Vec<SearchResult>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, source, label, content, embedding, chunk_order, indexed_at FROM chunks",
        )?;

        let mut results: Vec<SearchResult> = stmt
            .query_map([], Self::chunk_from_row)?
            .filter_map(|row| match row {
                Ok(chunk) => Some(chunk),
                Err(e) => {
                    warn!("Skipping unreadable chunk row: {}", e);
                    None
                }
            })
            .map(|chunk| {
                let score = cosine_similarity(query_embedding, &chunk.embedding);
                SearchResult { chunk, score }
            })
            .filter(|r| r.score >= min_score)
            .collect();

        // Ties keep index order so results are stable
        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.chunk.chunk_order.cmp(&b.chunk.chunk_order))
        });
        results.truncate(limit);

        debug!("Found {} matching chunks", results.len());
        Ok(results)
    }

    async fn document_count(&self) -> Result<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM chunks", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}
