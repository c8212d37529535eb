//! Agent runner with tool calling loop.

use super::Answerer;
use crate::cli::Output;
use crate::error::{DocQueryError, Result};
use crate::llm::{system_message, user_message, ChatModel};
use crate::tools::ToolRegistry;
use async_openai::types::{
    ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessageArgs,
    ChatCompletionRequestMessage, ChatCompletionRequestToolMessageArgs,
};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Default system prompt for the agent.
const DEFAULT_SYSTEM_PROMPT: &str = r#"You are a helpful assistant that answers questions about the user's data.

You have tools that answer questions about a loaded source (a CSV or Excel
table, a PDF document, or a transcribed YouTube video). Think step by step
about what you need to know, call the tools with clear, self-contained
questions, and combine what they return.

When you have enough information, reply with the final answer only.
If the tools cannot answer the question, say so plainly."#;

/// Agent that answers prompts by calling query tools.
pub struct Agent {
    model: Arc<dyn ChatModel>,
    tools: ToolRegistry,
    max_iterations: usize,
    system_prompt: String,
    show_tool_calls: bool,
}

impl Agent {
    /// Create a new agent over the given tools.
    pub fn new(model: Arc<dyn ChatModel>, tools: ToolRegistry) -> Self {
        Self {
            model,
            tools,
            max_iterations: 10,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            show_tool_calls: true,
        }
    }

    /// Set maximum model calls per prompt.
    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    /// Print each tool call to stderr as it happens.
    pub fn with_tool_call_display(mut self, show: bool) -> Self {
        self.show_tool_calls = show;
        self
    }

    /// Run the tool-calling loop for one prompt.
    #[instrument(skip(self))]
    pub async fn query(&self, prompt: &str) -> Result<AgentResponse> {
        let mut messages: Vec<ChatCompletionRequestMessage> =
            vec![system_message(&self.system_prompt)?, user_message(prompt)?];
        let definitions = self.tools.definitions();

        let mut iterations = 0;
        let mut tool_calls_made = Vec::new();

        loop {
            iterations += 1;
            if iterations > self.max_iterations {
                return Err(DocQueryError::Agent(format!(
                    "Agent exceeded maximum iterations ({})",
                    self.max_iterations
                )));
            }

            debug!("Agent iteration {}", iterations);
            let reply = self.model.chat(&messages, &definitions).await?;

            if reply.tool_calls.is_empty() {
                return Ok(AgentResponse {
                    content: reply.content.unwrap_or_default(),
                    tool_calls: tool_calls_made,
                    iterations,
                });
            }

            let mut assistant = ChatCompletionRequestAssistantMessageArgs::default();
            assistant.tool_calls(reply.tool_calls.clone());
            if let Some(content) = reply.content.filter(|c| !c.trim().is_empty()) {
                assistant.content(content);
            }
            messages.push(
                assistant
                    .build()
                    .map_err(|e| DocQueryError::Agent(e.to_string()))?
                    .into(),
            );

            for tool_call in &reply.tool_calls {
                let record = self.execute_tool_call(tool_call).await?;

                let tool_msg = ChatCompletionRequestToolMessageArgs::default()
                    .tool_call_id(&tool_call.id)
                    .content(record.result.clone())
                    .build()
                    .map_err(|e| DocQueryError::Agent(e.to_string()))?;
                messages.push(tool_msg.into());

                tool_calls_made.push(record);
            }
        }
    }

    /// Execute a single tool call. Engine failures are returned as errors.
    async fn execute_tool_call(
        &self,
        tool_call: &ChatCompletionMessageToolCall,
    ) -> Result<ToolCallRecord> {
        let name = &tool_call.function.name;
        let arguments = &tool_call.function.arguments;

        info!("Agent calling tool: {} with args: {}", name, arguments);
        if self.show_tool_calls {
            Output::tool_call(name, arguments);
        }

        let result = self.tools.call(name, arguments).await?;

        Ok(ToolCallRecord {
            name: name.clone(),
            arguments: arguments.clone(),
            result,
        })
    }
}

#[async_trait]
impl Answerer for Agent {
    async fn answer(&self, prompt: &str) -> Result<String> {
        Ok(self.query(prompt).await?.content)
    }
}

/// Response from an agent run.
#[derive(Debug)]
pub struct AgentResponse {
    /// The final response content from the agent.
    pub content: String,
    /// Record of all tool calls made during execution.
    pub tool_calls: Vec<ToolCallRecord>,
    /// Number of iterations (model calls) used.
    pub iterations: usize,
}

/// Record of a tool call made by the agent.
#[derive(Debug, Clone)]
pub struct ToolCallRecord {
    /// Name of the tool called.
    pub name: String,
    /// JSON arguments passed to the tool.
    pub arguments: String,
    /// Result returned by the tool.
    pub result: String,
}

impl std::fmt::Display for ToolCallRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.name, self.arguments)
    }
}
