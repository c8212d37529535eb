//! Chat model access shared by the agent and the query engines.

use crate::config::LlmSettings;
use crate::error::{DocQueryError, Result};
use crate::openai::{llm_client, ApiClient};
use async_openai::types::{
    ChatCompletionMessageToolCall, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    ChatCompletionTool, CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// One assistant turn.
#[derive(Debug, Clone, Default)]
pub struct ChatReply {
    pub content: Option<String>,
    pub tool_calls: Vec<ChatCompletionMessageToolCall>,
}

/// A chat-completion capable model.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Send a conversation, optionally offering tools, and return the reply.
    async fn chat(
        &self,
        messages: &[ChatCompletionRequestMessage],
        tools: &[ChatCompletionTool],
    ) -> Result<ChatReply>;

    /// Single-turn completion without tools.
    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        let messages = vec![system_message(system)?, user_message(user)?];
        let reply = self.chat(&messages, &[]).await?;
        reply
            .content
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| DocQueryError::Api("Empty response from LLM".to_string()))
    }
}

pub(crate) fn system_message(content: &str) -> Result<ChatCompletionRequestMessage> {
    Ok(ChatCompletionRequestSystemMessageArgs::default()
        .content(content.to_string())
        .build()
        .map_err(|e| DocQueryError::Api(e.to_string()))?
        .into())
}

pub(crate) fn user_message(content: &str) -> Result<ChatCompletionRequestMessage> {
    Ok(ChatCompletionRequestUserMessageArgs::default()
        .content(content.to_string())
        .build()
        .map_err(|e| DocQueryError::Api(e.to_string()))?
        .into())
}

/// Chat model reached through an OpenAI-compatible endpoint.
pub struct OpenAIChat {
    client: ApiClient,
    model: String,
}

impl OpenAIChat {
    pub fn new(client: ApiClient, model: &str) -> Self {
        Self {
            client,
            model: model.to_string(),
        }
    }

    pub fn from_settings(settings: &LlmSettings) -> Result<Self> {
        Ok(Self::new(llm_client(settings)?, &settings.model))
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl ChatModel for OpenAIChat {
    #[instrument(skip_all, fields(model = %self.model, messages = messages.len()))]
    async fn chat(
        &self,
        messages: &[ChatCompletionRequestMessage],
        tools: &[ChatCompletionTool],
    ) -> Result<ChatReply> {
        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(&self.model).messages(messages.to_vec());
        if !tools.is_empty() {
            args.tools(tools.to_vec());
        }
        let request = args.build().map_err(|e| DocQueryError::Api(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| DocQueryError::Api(format!("Chat completion failed: {}", e)))?;

        let message = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| DocQueryError::Api("No response from model".to_string()))?
            .message;

        debug!(
            "Model replied with {} tool calls",
            message.tool_calls.as_ref().map_or(0, Vec::len)
        );

        Ok(ChatReply {
            content: message.content,
            tool_calls: message.tool_calls.unwrap_or_default(),
        })
    }
}
