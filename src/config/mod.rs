//! Configuration module for docquery.
//!
//! Handles loading and managing application settings.

mod settings;

pub use settings::{
    EmbeddingSettings, GeneralSettings, IndexSettings, LlmSettings, ServerSettings, Settings,
    TranscriptionProvider, TranscriptionSettings, YoutubeSettings,
};
