//! Embeddings through an OpenAI-compatible API.

use super::Embedder;
use crate::config::EmbeddingSettings;
use crate::error::{DocQueryError, Result};
use crate::openai::{embedding_client, ApiClient};
use async_openai::types::{CreateEmbeddingRequestArgs, EmbeddingInput};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Inputs per embeddings request.
const BATCH_SIZE: usize = 100;

/// API-backed embedder.
pub struct OpenAIEmbedder {
    client: ApiClient,
    model: String,
    dimensions: usize,
}

impl OpenAIEmbedder {
    pub fn new(client: ApiClient, model: &str, dimensions: usize) -> Self {
        Self {
            client,
            model: model.to_string(),
            dimensions,
        }
    }

    /// Create an embedder from the configured endpoint and model.
    pub fn from_settings(settings: &EmbeddingSettings) -> Result<Self> {
        Ok(Self::new(
            embedding_client(settings)?,
            &settings.model,
            settings.dimensions as usize,
        ))
    }
}

#[async_trait]
impl Embedder for OpenAIEmbedder {
    #[instrument(skip(self, text))]
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let embeddings = self.embed_batch(&[text.to_string()]).await?;
        embeddings
            .into_iter()
            .next()
            .ok_or_else(|| DocQueryError::Embedding("Empty embedding response".to_string()))
    }

    #[instrument(skip(self, texts), fields(count = texts.len()))]
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut all_embeddings = Vec::with_capacity(texts.len());

        for batch in texts.chunks(BATCH_SIZE) {
            let request = CreateEmbeddingRequestArgs::default()
                .model(&self.model)
                .input(EmbeddingInput::StringArray(batch.to_vec()))
                .dimensions(self.dimensions as u32)
                .build()
                .map_err(|e| DocQueryError::Embedding(format!("Failed to build request: {}", e)))?;

            let response = self
                .client
                .embeddings()
                .create(request)
                .await
                .map_err(|e| DocQueryError::Api(format!("Embedding API error: {}", e)))?;

            let mut data = response.data;
            data.sort_by_key(|e| e.index);

            if data.len() != batch.len() {
                return Err(DocQueryError::Embedding(format!(
                    "Expected {} embeddings, got {}",
                    batch.len(),
                    data.len()
                )));
            }

            all_embeddings.extend(data.into_iter().map(|d| d.embedding));
        }

        debug!("Generated {} embeddings", all_embeddings.len());
        Ok(all_embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
