//! Error types for docquery.

use thiserror::Error;

/// Library-level error type for docquery operations.
#[derive(Error, Debug)]
pub enum DocQueryError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Invalid file type selected. Please choose CSV, Excel, PDF, or YouTube.")]
    InvalidSourceKind(String),

    #[error("Error loading {kind}: {message}")]
    SourceParse { kind: String, message: String },

    #[error("Audio download failed: {0}")]
    AudioDownload(String),

    #[error("Transcription failed: {0}")]
    Transcription(String),

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Vector store error: {0}")]
    VectorStore(String),

    #[error("Index error: {0}")]
    Index(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("A tool named '{0}' is already registered")]
    DuplicateTool(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("LLM API error: {0}")]
    Api(String),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("External tool failed: {0}")]
    ToolFailed(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Agent error: {0}")]
    Agent(String),
}

/// Result type alias for docquery operations.
pub type Result<T> = std::result::Result<T, DocQueryError>;
