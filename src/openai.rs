//! OpenAI-compatible client construction.
//!
//! Both the reasoning model (Groq by default) and the embedding model
//! (OpenAI by default) speak the same wire protocol; they differ only in
//! base URL and credential.

use crate::config::{EmbeddingSettings, LlmSettings, TranscriptionSettings};
use crate::error::{DocQueryError, Result};
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Default timeout for API requests (5 minutes).
const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Client type shared by every API consumer in the crate.
pub type ApiClient = Client<OpenAIConfig>;

/// Create a client for the configured reasoning model.
pub fn llm_client(settings: &LlmSettings) -> Result<ApiClient> {
    create_client(
        &settings.base_url,
        &settings.api_key_env,
        Duration::from_secs(settings.timeout_secs),
    )
}

/// Create a client for the configured embedding model.
pub fn embedding_client(settings: &EmbeddingSettings) -> Result<ApiClient> {
    create_client(
        &settings.base_url,
        &settings.api_key_env,
        Duration::from_secs(DEFAULT_TIMEOUT_SECS),
    )
}

/// Create a client for the API transcription provider.
pub fn transcription_client(settings: &TranscriptionSettings) -> Result<ApiClient> {
    create_client(
        &settings.base_url,
        &settings.api_key_env,
        Duration::from_secs(DEFAULT_TIMEOUT_SECS),
    )
}

/// Create a client against `base_url`, reading the key from `api_key_env`.
pub fn create_client(base_url: &str, api_key_env: &str, timeout: Duration) -> Result<ApiClient> {
    let api_key = read_api_key(api_key_env)?;

    let http_client = reqwest::Client::builder().timeout(timeout).build()?;

    let config = OpenAIConfig::new()
        .with_api_base(base_url.trim_end_matches('/'))
        .with_api_key(api_key);

    Ok(Client::with_config(config).with_http_client(http_client))
}

/// Read a non-empty API key from the environment.
pub fn read_api_key(var: &str) -> Result<String> {
    match std::env::var(var) {
        Ok(key) if !key.trim().is_empty() => Ok(key),
        Ok(_) => Err(DocQueryError::Config(format!(
            "{} is empty. Set it with: export {}='...'",
            var, var
        ))),
        Err(_) => Err(DocQueryError::Config(format!(
            "{} not set. Set it with: export {}='...' or add it to .env",
            var, var
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_is_config_error() {
        let err = read_api_key("DOCQUERY_TEST_KEY_THAT_IS_NEVER_SET").unwrap_err();
        assert!(matches!(err, DocQueryError::Config(_)));
        assert!(err.to_string().contains("DOCQUERY_TEST_KEY_THAT_IS_NEVER_SET"));
    }
}
