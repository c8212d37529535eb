//! Hosted transcription through an OpenAI-compatible audio endpoint.

use super::Transcriber;
use crate::config::TranscriptionSettings;
use crate::error::{DocQueryError, Result};
use crate::openai::{transcription_client, ApiClient};
use async_openai::types::{AudioInput, AudioResponseFormat, CreateTranscriptionRequestArgs};
use async_trait::async_trait;
use std::path::Path;
use tracing::{debug, instrument};

/// Transcriber backed by the `/audio/transcriptions` endpoint.
pub struct ApiTranscriber {
    client: ApiClient,
    model: String,
}

impl ApiTranscriber {
    pub fn new(client: ApiClient, model: &str) -> Self {
        Self {
            client,
            model: model.to_string(),
        }
    }

    pub fn from_settings(settings: &TranscriptionSettings) -> Result<Self> {
        Ok(Self::new(transcription_client(settings)?, &settings.api_model))
    }
}

#[async_trait]
impl Transcriber for ApiTranscriber {
    #[instrument(skip(self), fields(audio_path = %audio_path.display()))]
    async fn transcribe(&self, audio_path: &Path) -> Result<String> {
        let file_bytes = tokio::fs::read(audio_path).await?;
        debug!("Uploading {} bytes for transcription", file_bytes.len());

        let file_name = audio_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("audio.mp4")
            .to_string();

        let request = CreateTranscriptionRequestArgs::default()
            .file(AudioInput::from_vec_u8(file_name, file_bytes))
            .model(&self.model)
            .response_format(AudioResponseFormat::Json)
            .build()
            .map_err(|e| DocQueryError::Transcription(format!("Failed to build request: {}", e)))?;

        let response = self
            .client
            .audio()
            .transcribe(request)
            .await
            .map_err(|e| DocQueryError::Api(format!("Transcription API error: {}", e)))?;

        Ok(response.text.trim().to_string())
    }
}
