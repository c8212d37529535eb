//! Configuration settings for docquery.

use crate::error::{DocQueryError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub llm: LlmSettings,
    pub embedding: EmbeddingSettings,
    pub transcription: TranscriptionSettings,
    pub index: IndexSettings,
    pub youtube: YoutubeSettings,
    pub server: ServerSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Log level used when no `-v` flag is given (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
        }
    }
}

/// Reasoning model used by the agent and the query engines.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// Base URL of an OpenAI-compatible API.
    pub base_url: String,
    /// Model identifier.
    pub model: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Maximum tool-calling rounds per prompt.
    pub max_iterations: usize,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.groq.com/openai/v1".to_string(),
            model: "llama3-70b-8192".to_string(),
            api_key_env: "GROQ_API_KEY".to_string(),
            max_iterations: 10,
            timeout_secs: 300,
        }
    }
}

/// Embedding generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Base URL of an OpenAI-compatible API.
    pub base_url: String,
    /// Embedding model to use.
    pub model: String,
    /// Embedding dimensions.
    pub dimensions: u32,
    /// Environment variable holding the API key.
    pub api_key_env: String,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "text-embedding-3-small".to_string(),
            dimensions: 1536,
            api_key_env: "OPENAI_API_KEY".to_string(),
        }
    }
}

/// Transcription provider type.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptionProvider {
    /// Local `whisper` executable.
    #[default]
    Local,
    /// OpenAI-compatible transcription endpoint.
    Api,
}

impl std::str::FromStr for TranscriptionProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" | "whisper" => Ok(TranscriptionProvider::Local),
            "api" | "openai" => Ok(TranscriptionProvider::Api),
            _ => Err(format!("Unknown transcription provider: {}", s)),
        }
    }
}

impl std::fmt::Display for TranscriptionProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TranscriptionProvider::Local => write!(f, "local"),
            TranscriptionProvider::Api => write!(f, "api"),
        }
    }
}

/// Speech-to-text settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionSettings {
    /// Which transcription backend to use.
    pub provider: TranscriptionProvider,
    /// Whisper model size for the local provider (tiny, base, small, medium, large).
    pub model_size: String,
    /// Model identifier for the API provider.
    pub api_model: String,
    /// Base URL of an OpenAI-compatible API, for the API provider.
    pub base_url: String,
    /// Environment variable holding the API key, for the API provider.
    pub api_key_env: String,
}

impl Default for TranscriptionSettings {
    fn default() -> Self {
        Self {
            provider: TranscriptionProvider::Local,
            model_size: "base".to_string(),
            api_model: "whisper-1".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
        }
    }
}

/// Persisted index settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexSettings {
    /// Directory that holds one sub-directory per named index.
    pub root: String,
    /// Words per chunk.
    pub chunk_words: usize,
    /// Words shared between neighbouring chunks.
    pub overlap_words: usize,
    /// Chunks retrieved per query.
    pub top_k: usize,
    /// Drop retrieved chunks scoring below this cosine similarity.
    pub min_score: Option<f32>,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            root: ".".to_string(),
            chunk_words: 256,
            overlap_words: 32,
            top_k: 2,
            min_score: None,
        }
    }
}

/// YouTube download settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct YoutubeSettings {
    /// Directory receiving `audio.mp4` and `transcript.txt`.
    pub save_dir: String,
}

impl Default for YoutubeSettings {
    fn default() -> Self {
        Self {
            save_dir: "data".to_string(),
        }
    }
}

/// Web stub settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
        }
    }
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| DocQueryError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("docquery")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded index root.
    pub fn index_root(&self) -> PathBuf {
        Self::expand_path(&self.index.root)
    }

    /// Get the expanded YouTube save directory.
    pub fn youtube_save_dir(&self) -> PathBuf {
        Self::expand_path(&self.youtube.save_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.llm.model, "llama3-70b-8192");
        assert_eq!(settings.transcription.model_size, "base");
        assert_eq!(settings.transcription.provider, TranscriptionProvider::Local);
        assert_eq!(settings.youtube.save_dir, "data");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [llm]
            model = "llama-3.3-70b-versatile"

            [transcription]
            provider = "api"

            [index]
            min_score = 0.25
            "#,
        )
        .unwrap();

        assert_eq!(settings.llm.model, "llama-3.3-70b-versatile");
        assert_eq!(settings.llm.api_key_env, "GROQ_API_KEY");
        assert_eq!(settings.transcription.provider, TranscriptionProvider::Api);
        assert_eq!(settings.transcription.model_size, "base");
        assert_eq!(settings.index.top_k, 2);
        assert_eq!(settings.index.min_score, Some(0.25));
        assert_eq!(Settings::default().index.min_score, None);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut settings = Settings::default();
        settings.index.root = "/srv/indexes".to_string();
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.index.root, "/srv/indexes");
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.server.port, 5000);
    }

    #[test]
    fn test_provider_from_str() {
        assert_eq!("Whisper".parse::<TranscriptionProvider>(), Ok(TranscriptionProvider::Local));
        assert_eq!("api".parse::<TranscriptionProvider>(), Ok(TranscriptionProvider::Api));
        assert!("cloud".parse::<TranscriptionProvider>().is_err());
    }
}
