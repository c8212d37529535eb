//! Named, persisted vector indexes.
//!
//! An index lives in `<root>/<name>/` as a SQLite store (`vectors.db`) plus a
//! manifest (`index.toml`). The directory's presence alone decides whether
//! an index is rebuilt: [`IndexBuilder::get_or_build`] loads any existing
//! directory as-is and never compares it against new content.

mod builder;
mod manifest;

pub use builder::{IndexBuilder, IndexContent};
pub use manifest::IndexManifest;

use crate::embedding::Embedder;
use crate::error::{DocQueryError, Result};
use crate::vector_store::{SearchResult, SqliteVectorStore, VectorStore};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// File holding chunks and embeddings.
pub const STORE_FILE: &str = "vectors.db";

/// File holding the [`IndexManifest`].
pub const MANIFEST_FILE: &str = "index.toml";

/// A loaded index ready for retrieval.
pub struct VectorIndex {
    manifest: IndexManifest,
    store: SqliteVectorStore,
    embedder: Arc<dyn Embedder>,
}

impl VectorIndex {
    /// Open the index persisted in `dir`.
    ///
    /// Fails when the directory is incomplete or was built with an embedder
    /// of a different dimension; either way the directory must be deleted
    /// before the index can be rebuilt.
    pub async fn load(dir: &Path, embedder: Arc<dyn Embedder>) -> Result<Self> {
        let store_path = dir.join(STORE_FILE);
        let manifest_path = dir.join(MANIFEST_FILE);

        for required in [&store_path, &manifest_path] {
            if !required.exists() {
                return Err(DocQueryError::Index(format!(
                    "{} exists but is missing {}. Delete the directory to rebuild it.",
                    dir.display(),
                    required.file_name().map(|n| n.to_string_lossy()).unwrap_or_default()
                )));
            }
        }

        let manifest = IndexManifest::load(&manifest_path)?;
        if manifest.dimensions != embedder.dimensions() {
            return Err(DocQueryError::Index(format!(
                "Index '{}' was built with {} dimensions but the embedder produces {}. Delete {} to rebuild it.",
                manifest.name,
                manifest.dimensions,
                embedder.dimensions(),
                dir.display()
            )));
        }

        let store = SqliteVectorStore::open(&store_path)?;
        let stored = store.document_count().await?;
        if stored != manifest.chunk_count {
            return Err(DocQueryError::Index(format!(
                "Index '{}' is incomplete ({} of {} chunks stored). Delete {} to rebuild it.",
                manifest.name,
                stored,
                manifest.chunk_count,
                dir.display()
            )));
        }
        debug!("Loaded index '{}' ({} chunks)", manifest.name, manifest.chunk_count);

        Ok(Self {
            manifest,
            store,
            embedder,
        })
    }

    pub fn name(&self) -> &str {
        &self.manifest.name
    }

    pub fn manifest(&self) -> &IndexManifest {
        &self.manifest
    }

    /// Embed `query` and return the `top_k` most similar chunks.
    pub async fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<SearchResult>> {
        let embedding = self.embedder.embed(query).await?;
        self.store.search(&embedding, top_k).await
    }

    /// Like [`retrieve`](Self::retrieve), dropping chunks scoring below `min_score`.
    pub async fn retrieve_with_threshold(
        &self,
        query: &str,
        top_k: usize,
        min_score: f32,
    ) -> Result<Vec<SearchResult>> {
        let embedding = self.embedder.embed(query).await?;
        self.store
            .search_with_threshold(&embedding, top_k, min_score)
            .await
    }
}
