//! Session orchestration.
//!
//! Turns a [`SessionConfig`] into the [`ToolRegistry`] the agent runs over:
//! load or transcribe the source, build or load its index where needed, and
//! wrap the resulting query engine as a tool.

use crate::chunking::{ChunkingConfig, WordChunker};
use crate::cli::Output;
use crate::config::Settings;
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::error::Result;
use crate::index::{IndexBuilder, IndexContent, VectorIndex};
use crate::llm::{ChatModel, OpenAIChat};
use crate::query::{QueryEngine, RetrieverQueryEngine, TableQueryEngine};
use crate::source::{self, DocumentSet, LoadedSource, SourceKind};
use crate::tools::{QueryTool, ToolRegistry};
use crate::transcription::MediaTranscriber;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument};

/// Index name used for a source kind when none is given.
pub fn default_index_name(kind: SourceKind) -> Option<&'static str> {
    match kind {
        SourceKind::Pdf => Some("pdf_data"),
        SourceKind::YouTube => Some("youtube_video"),
        SourceKind::Csv | SourceKind::Excel => None,
    }
}

/// Everything a session needs to know up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub kind: SourceKind,
    /// File path, or video URL for YouTube.
    pub input: String,
    /// Overrides the default index name for indexed kinds.
    pub index_name: Option<String>,
}

impl SessionConfig {
    pub fn new(kind: SourceKind, input: &str) -> Self {
        Self {
            kind,
            input: input.trim().to_string(),
            index_name: None,
        }
    }

    pub fn with_index_name(mut self, name: &str) -> Self {
        self.index_name = Some(name.to_string());
        self
    }

    /// Index this session reads or writes, if its kind is indexed.
    pub fn index_name(&self) -> Option<&str> {
        match default_index_name(self.kind) {
            Some(default) => Some(self.index_name.as_deref().unwrap_or(default)),
            None => None,
        }
    }
}

/// Builds tools for sessions from settings and collaborators.
///
/// Collaborators that need credentials are created on first use, so a CSV
/// session never needs an embedding key.
pub struct Orchestrator {
    settings: Settings,
    model: Option<Arc<dyn ChatModel>>,
    embedder: Option<Arc<dyn Embedder>>,
    media: Option<Arc<MediaTranscriber>>,
}

impl Orchestrator {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            model: None,
            embedder: None,
            media: None,
        }
    }

    /// Create an orchestrator with custom components.
    pub fn with_components(
        settings: Settings,
        model: Arc<dyn ChatModel>,
        embedder: Arc<dyn Embedder>,
        media: Arc<MediaTranscriber>,
    ) -> Self {
        Self {
            settings,
            model: Some(model),
            embedder: Some(embedder),
            media: Some(media),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The reasoning model, shared by the agent and the query engines.
    pub fn model(&mut self) -> Result<Arc<dyn ChatModel>> {
        if let Some(model) = &self.model {
            return Ok(model.clone());
        }
        let model: Arc<dyn ChatModel> = Arc::new(OpenAIChat::from_settings(&self.settings.llm)?);
        self.model = Some(model.clone());
        Ok(model)
    }

    fn embedder(&mut self) -> Result<Arc<dyn Embedder>> {
        if let Some(embedder) = &self.embedder {
            return Ok(embedder.clone());
        }
        let embedder: Arc<dyn Embedder> =
            Arc::new(OpenAIEmbedder::from_settings(&self.settings.embedding)?);
        self.embedder = Some(embedder.clone());
        Ok(embedder)
    }

    fn media(&mut self) -> Result<Arc<MediaTranscriber>> {
        if let Some(media) = &self.media {
            return Ok(media.clone());
        }
        let media = Arc::new(MediaTranscriber::from_settings(&self.settings)?);
        self.media = Some(media.clone());
        Ok(media)
    }

    fn index_builder(&mut self) -> Result<IndexBuilder> {
        Ok(IndexBuilder::new(
            self.settings.index_root(),
            self.embedder()?,
            WordChunker::new(ChunkingConfig::from(&self.settings.index)),
        ))
    }

    /// Produce the tools for a session.
    ///
    /// A source that fails to load has already been reported and yields an
    /// empty registry. Download, transcription and indexing errors propagate.
    #[instrument(skip(self), fields(kind = %config.kind))]
    pub async fn build_tools(&mut self, config: &SessionConfig) -> Result<ToolRegistry> {
        let mut registry = ToolRegistry::new();

        let engine: Arc<dyn QueryEngine> = match config.kind {
            SourceKind::Csv | SourceKind::Excel | SourceKind::Pdf => {
                match source::load(config.kind, Path::new(&config.input)) {
                    None => return Ok(registry),
                    Some(LoadedSource::Table(table)) => {
                        info!("Loaded table with {} rows", table.num_rows());
                        Arc::new(TableQueryEngine::new(table, self.model()?))
                    }
                    Some(LoadedSource::Documents(documents)) => {
                        info!("Loaded {} pages", documents.len());
                        self.retriever(config, documents).await?
                    }
                }
            }
            SourceKind::YouTube => {
                let save_dir = self.settings.youtube_save_dir();
                let media = self.media()?;

                let spinner = Output::spinner("Downloading and transcribing audio...");
                let transcript = media.download_and_transcribe(&config.input, &save_dir).await;
                spinner.finish_and_clear();
                let transcript = transcript?;
                Output::success(&format!("Transcript saved to {}", transcript.display()));

                let documents = DocumentSet::from_transcript(&transcript)?;
                self.retriever(config, documents).await?
            }
        };

        registry.register(QueryTool::for_kind(config.kind, engine))?;
        Ok(registry)
    }

    async fn retriever(
        &mut self,
        config: &SessionConfig,
        documents: DocumentSet,
    ) -> Result<Arc<dyn QueryEngine>> {
        let name = config.index_name().unwrap_or(config.kind.label());
        let index: VectorIndex = self
            .index_builder()?
            .get_or_build(name, IndexContent::Documents(documents))
            .await?;

        info!(
            "Index '{}' ready with {} chunks",
            index.name(),
            index.manifest().chunk_count
        );

        let mut engine =
            RetrieverQueryEngine::new(Arc::new(index), self.model()?, self.settings.index.top_k);
        if let Some(min_score) = self.settings.index.min_score {
            engine = engine.with_min_score(min_score);
        }
        Ok(Arc::new(engine))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::testing::HashingEmbedder;
    use crate::error::DocQueryError;
    use crate::llm::testing::{text, ScriptedChat};
    use crate::source::pdf_testing::write_pdf;
    use crate::transcription::testing::{FakeDownloader, FakeTranscriber};
    use crate::transcription::TRANSCRIPT_FILE_NAME;

    struct Fixture {
        dir: tempfile::TempDir,
        model: Arc<ScriptedChat>,
        embedder: Arc<HashingEmbedder>,
        downloader: Arc<FakeDownloader>,
    }

    impl Fixture {
        fn new(replies: Vec<crate::llm::ChatReply>) -> Self {
            Self {
                dir: tempfile::tempdir().unwrap(),
                model: Arc::new(ScriptedChat::new(replies)),
                embedder: Arc::new(HashingEmbedder::new(32)),
                downloader: Arc::new(FakeDownloader::default()),
            }
        }

        fn orchestrator(&self, transcript: &'static str) -> Orchestrator {
            self.orchestrator_with(transcript, Settings::default())
        }

        fn orchestrator_with(&self, transcript: &'static str, mut settings: Settings) -> Orchestrator {
            settings.index.root = self.dir.path().join("indexes").display().to_string();
            settings.youtube.save_dir = self.dir.path().join("data").display().to_string();

            Orchestrator::with_components(
                settings,
                self.model.clone(),
                self.embedder.clone(),
                Arc::new(MediaTranscriber::new(
                    self.downloader.clone(),
                    Arc::new(FakeTranscriber(transcript)),
                )),
            )
        }
    }

    #[test]
    fn test_index_names() {
        let pdf = SessionConfig::new(SourceKind::Pdf, " report.pdf ");
        assert_eq!(pdf.input, "report.pdf");
        assert_eq!(pdf.index_name(), Some("pdf_data"));
        assert_eq!(
            SessionConfig::new(SourceKind::YouTube, "x").index_name(),
            Some("youtube_video")
        );
        assert_eq!(
            pdf.with_index_name("q3_report").index_name(),
            Some("q3_report")
        );
        assert_eq!(
            SessionConfig::new(SourceKind::Csv, "a.csv")
                .with_index_name("ignored")
                .index_name(),
            None
        );
    }

    #[tokio::test]
    async fn test_csv_session_builds_table_tool() {
        let fixture = Fixture::new(vec![text(r#"{"aggregate": {"op": "count"}}"#)]);
        let path = fixture.dir.path().join("people.csv");
        std::fs::write(&path, "name,age\nAda,36\nGrace,45\n").unwrap();

        let registry = fixture
            .orchestrator("")
            .build_tools(&SessionConfig::new(SourceKind::Csv, &path.display().to_string()))
            .await
            .unwrap();

        assert_eq!(registry.names(), ["csv_data"]);
        let answer = registry.call("csv_data", r#"{"input": "how many people?"}"#).await.unwrap();
        assert!(answer.contains('2'));
        assert_eq!(fixture.embedder.calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_file_gives_empty_registry() {
        let fixture = Fixture::new(vec![]);
        let path = fixture.dir.path().join("absent.xlsx");

        let registry = fixture
            .orchestrator("")
            .build_tools(&SessionConfig::new(SourceKind::Excel, &path.display().to_string()))
            .await
            .unwrap();
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_pdf_session_indexes_once() {
        let fixture = Fixture::new(vec![]);
        let path = fixture.dir.path().join("report.pdf");
        write_pdf(&path, &["Quarterly revenue rose", "Costs fell sharply"]);
        let config = SessionConfig::new(SourceKind::Pdf, &path.display().to_string());

        let registry = fixture.orchestrator("").build_tools(&config).await.unwrap();
        assert_eq!(registry.names(), ["pdf_data"]);
        assert!(fixture.dir.path().join("indexes").join("pdf_data").exists());
        let embedded = fixture.embedder.calls();
        assert!(embedded > 0);

        fixture.orchestrator("").build_tools(&config).await.unwrap();
        assert_eq!(fixture.embedder.calls(), embedded);
    }

    #[tokio::test]
    async fn test_min_score_setting_filters_retrieval() {
        let fixture = Fixture::new(vec![]);
        let path = fixture.dir.path().join("report.pdf");
        write_pdf(&path, &["Quarterly revenue rose"]);

        let mut settings = Settings::default();
        settings.index.min_score = Some(2.0);
        let registry = fixture
            .orchestrator_with("", settings)
            .build_tools(&SessionConfig::new(SourceKind::Pdf, &path.display().to_string()))
            .await
            .unwrap();

        let answer = registry
            .call("pdf_data", r#"{"input": "quarterly revenue"}"#)
            .await
            .unwrap();
        assert_eq!(answer, crate::query::NO_CONTEXT_ANSWER);
        assert_eq!(fixture.model.request_count(), 0);
    }

    #[tokio::test]
    async fn test_youtube_session_transcribes_and_indexes() {
        let fixture = Fixture::new(vec![text("It is about Rust.")]);
        let config = SessionConfig::new(SourceKind::YouTube, "https://youtu.be/dQw4w9WgXcQ");

        let registry = fixture
            .orchestrator("Today we talk about ownership in Rust.")
            .build_tools(&config)
            .await
            .unwrap();

        let transcript = fixture.dir.path().join("data").join(TRANSCRIPT_FILE_NAME);
        assert_eq!(
            std::fs::read_to_string(transcript).unwrap(),
            "Today we talk about ownership in Rust."
        );
        assert!(fixture.dir.path().join("indexes").join("youtube_video").exists());
        assert_eq!(registry.names(), ["youtube_data"]);

        let answer = registry
            .call("youtube_data", r#"{"input": "what is the video about?"}"#)
            .await
            .unwrap();
        assert_eq!(answer, "It is about Rust.");
    }

    #[tokio::test]
    async fn test_invalid_youtube_url_propagates() {
        let fixture = Fixture::new(vec![]);
        let err = fixture
            .orchestrator("unused")
            .build_tools(&SessionConfig::new(SourceKind::YouTube, "not a url"))
            .await
            .unwrap_err();

        assert!(matches!(err, DocQueryError::InvalidInput(_)));
        assert!(fixture.downloader.requested.lock().unwrap().is_empty());
    }
}
