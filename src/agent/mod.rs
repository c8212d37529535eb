//! Tool-calling agent over the registered query tools.

mod runner;

pub use runner::{Agent, AgentResponse, ToolCallRecord};

use crate::error::Result;
use async_trait::async_trait;

/// Something that turns a prompt into an answer.
#[async_trait]
pub trait Answerer: Send + Sync {
    async fn answer(&self, prompt: &str) -> Result<String>;
}
