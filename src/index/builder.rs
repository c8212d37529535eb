//! Build-or-load for named indexes.

use super::{IndexManifest, VectorIndex, MANIFEST_FILE, STORE_FILE};
use crate::chunking::WordChunker;
use crate::cli::Output;
use crate::embedding::Embedder;
use crate::error::{DocQueryError, Result};
use crate::source::DocumentSet;
use crate::vector_store::{Chunk, SqliteVectorStore, VectorStore};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, instrument};

/// Content an index can be built from.
#[derive(Debug, Clone)]
pub enum IndexContent {
    Documents(DocumentSet),
}

/// Creates indexes under a root directory, or loads them if present.
pub struct IndexBuilder {
    root: PathBuf,
    embedder: Arc<dyn Embedder>,
    chunker: WordChunker,
}

impl IndexBuilder {
    pub fn new(root: PathBuf, embedder: Arc<dyn Embedder>, chunker: WordChunker) -> Self {
        Self {
            root,
            embedder,
            chunker,
        }
    }

    /// Load `<root>/<name>` if the directory exists, otherwise build it from
    /// `content`. An existing directory wins even if `content` differs.
    #[instrument(skip(self, content))]
    pub async fn get_or_build(&self, name: &str, content: IndexContent) -> Result<VectorIndex> {
        validate_name(name)?;
        let dir = self.root.join(name);

        if dir.exists() {
            info!(
                "Index '{}' already exists at {}, loading it and ignoring new content",
                name,
                dir.display()
            );
            return VectorIndex::load(&dir, self.embedder.clone()).await;
        }

        Output::info(&format!("Building index {}", name));
        self.build(name, &dir, content).await?;
        VectorIndex::load(&dir, self.embedder.clone()).await
    }

    async fn build(&self, name: &str, dir: &Path, content: IndexContent) -> Result<()> {
        let IndexContent::Documents(documents) = content;

        let pieces = self.chunker.split(&documents);
        if pieces.is_empty() {
            return Err(DocQueryError::Index(format!(
                "No text to index for '{}'",
                name
            )));
        }

        std::fs::create_dir_all(&self.root)?;
        // Dropped (and removed) on any early return below
        let staging = tempfile::Builder::new()
            .prefix(&format!(".{}-", name))
            .tempdir_in(&self.root)?;

        let spinner = Output::spinner(&format!("Embedding {} chunks...", pieces.len()));
        let texts: Vec<String> = pieces.iter().map(|p| p.content.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await;
        spinner.finish_and_clear();
        let embeddings = embeddings?;

        if embeddings.len() != pieces.len() {
            return Err(DocQueryError::Embedding(format!(
                "Expected {} embeddings, got {}",
                pieces.len(),
                embeddings.len()
            )));
        }

        let chunks: Vec<Chunk> = pieces
            .into_iter()
            .zip(embeddings)
            .map(|(piece, embedding)| {
                Chunk::new(piece.source, piece.label, piece.content, embedding, piece.order)
            })
            .collect();

        {
            let store = SqliteVectorStore::open(&staging.path().join(STORE_FILE))?;
            store.upsert_batch(&chunks).await?;
        }

        IndexManifest::new(
            name,
            self.embedder.model_name(),
            self.embedder.dimensions(),
            chunks.len(),
            documents.len(),
        )
        .save(&staging.path().join(MANIFEST_FILE))?;

        let staged = staging.keep();
        if let Err(e) = std::fs::rename(&staged, dir) {
            let _ = std::fs::remove_dir_all(&staged);
            return Err(e.into());
        }

        info!("Built index '{}' with {} chunks", name, chunks.len());
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<()> {
    let invalid = name.trim().is_empty()
        || name.starts_with('.')
        || name.contains(['/', '\\'])
        || Path::new(name).is_absolute();

    if invalid {
        return Err(DocQueryError::InvalidInput(format!(
            "Invalid index name '{}': use a plain directory name",
            name
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunking::ChunkingConfig;
    use crate::embedding::testing::HashingEmbedder;
    use crate::source::SourceDocument;
    use async_trait::async_trait;

    fn documents(pages: &[&str]) -> IndexContent {
        IndexContent::Documents(DocumentSet::new(
            pages
                .iter()
                .enumerate()
                .map(|(i, text)| {
                    SourceDocument::new(text.to_string(), "doc.pdf".into(), Some((i + 1).to_string()))
                })
                .collect(),
        ))
    }

    fn builder(root: &Path, embedder: Arc<HashingEmbedder>) -> IndexBuilder {
        IndexBuilder::new(
            root.to_path_buf(),
            embedder,
            WordChunker::new(ChunkingConfig {
                chunk_words: 8,
                overlap_words: 2,
            }),
        )
    }

    #[tokio::test]
    async fn test_builds_once_then_loads() {
        let root = tempfile::tempdir().unwrap();
        let embedder = Arc::new(HashingEmbedder::new(32));
        let builder = builder(root.path(), embedder.clone());

        let index = builder
            .get_or_build("pdf_data", documents(&["cats purr softly", "dogs bark loudly"]))
            .await
            .unwrap();
        assert_eq!(index.manifest().chunk_count, 2);
        assert!(root.path().join("pdf_data").join(STORE_FILE).exists());
        assert!(root.path().join("pdf_data").join(MANIFEST_FILE).exists());
        let calls_after_build = embedder.calls();
        assert_eq!(calls_after_build, 2);

        let again = builder
            .get_or_build("pdf_data", documents(&["entirely different content"]))
            .await
            .unwrap();
        assert_eq!(embedder.calls(), calls_after_build);
        assert_eq!(again.manifest().chunk_count, 2);
    }

    #[tokio::test]
    async fn test_existing_directory_is_loaded_without_embedding() {
        let root = tempfile::tempdir().unwrap();
        builder(root.path(), Arc::new(HashingEmbedder::new(32)))
            .get_or_build("youtube_video", documents(&["old transcript about rust"]))
            .await
            .unwrap();

        let fresh = Arc::new(HashingEmbedder::new(32));
        let index = builder(root.path(), fresh.clone())
            .get_or_build("youtube_video", documents(&["new transcript about go"]))
            .await
            .unwrap();

        assert_eq!(fresh.calls(), 0);
        let results = index.retrieve("rust", 1).await.unwrap();
        assert_eq!(results[0].chunk.content, "old transcript about rust");
    }

    #[tokio::test]
    async fn test_retrieve_ranks_by_similarity() {
        let root = tempfile::tempdir().unwrap();
        let index = builder(root.path(), Arc::new(HashingEmbedder::new(64)))
            .get_or_build(
                "pdf_data",
                documents(&["revenue grew in march", "the office cat sleeps", "march revenue report"]),
            )
            .await
            .unwrap();

        let results = index.retrieve("march revenue", 2).await.unwrap();
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.chunk.content.contains("revenue")));
    }

    #[tokio::test]
    async fn test_rejects_path_like_names() {
        let root = tempfile::tempdir().unwrap();
        let builder = builder(root.path(), Arc::new(HashingEmbedder::new(8)));

        for name in ["", "../escape", "a/b", ".hidden"] {
            let err = builder
                .get_or_build(name, documents(&["text"]))
                .await
                .err()
                .unwrap();
            assert!(matches!(err, DocQueryError::InvalidInput(_)), "{}", name);
        }
    }

    #[tokio::test]
    async fn test_dimension_mismatch_asks_for_rebuild() {
        let root = tempfile::tempdir().unwrap();
        builder(root.path(), Arc::new(HashingEmbedder::new(32)))
            .get_or_build("pdf_data", documents(&["cats purr softly"]))
            .await
            .unwrap();

        let wider = Arc::new(HashingEmbedder::new(64));
        let err = builder(root.path(), wider.clone())
            .get_or_build("pdf_data", documents(&["cats purr softly"]))
            .await
            .err()
            .unwrap();

        assert!(matches!(err, DocQueryError::Index(_)));
        let message = err.to_string();
        assert!(message.contains("32 dimensions"), "{}", message);
        assert!(message.contains("produces 64"), "{}", message);
        assert!(message.contains("Delete"), "{}", message);
        assert_eq!(wider.calls(), 0);
    }

    #[tokio::test]
    async fn test_store_missing_chunks_asks_for_rebuild() {
        let root = tempfile::tempdir().unwrap();
        let embedder = Arc::new(HashingEmbedder::new(32));
        builder(root.path(), embedder.clone())
            .get_or_build("pdf_data", documents(&["cats purr softly", "dogs bark loudly"]))
            .await
            .unwrap();

        let dir = root.path().join("pdf_data");
        IndexManifest::new("pdf_data", embedder.model_name(), 32, 5, 2)
            .save(&dir.join(MANIFEST_FILE))
            .unwrap();

        let err = builder(root.path(), embedder)
            .get_or_build("pdf_data", documents(&["cats purr softly"]))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, DocQueryError::Index(_)));
        assert!(err.to_string().contains("2 of 5 chunks"), "{}", err);
    }

    struct FailingEmbedder;

    #[async_trait]
    impl Embedder for FailingEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Err(DocQueryError::Embedding("offline".into()))
        }

        async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Err(DocQueryError::Embedding("offline".into()))
        }

        fn dimensions(&self) -> usize {
            8
        }

        fn model_name(&self) -> &str {
            "failing"
        }
    }

    #[tokio::test]
    async fn test_failed_build_leaves_nothing_behind() {
        let root = tempfile::tempdir().unwrap();
        let builder = IndexBuilder::new(
            root.path().to_path_buf(),
            Arc::new(FailingEmbedder),
            WordChunker::default(),
        );

        let err = builder
            .get_or_build("pdf_data", documents(&["some text"]))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, DocQueryError::Embedding(_)));
        assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_empty_content_is_an_error() {
        let root = tempfile::tempdir().unwrap();
        let err = builder(root.path(), Arc::new(HashingEmbedder::new(8)))
            .get_or_build("youtube_video", documents(&["   "]))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, DocQueryError::Index(_)));
        assert!(!root.path().join("youtube_video").exists());
    }
}
