//! Retrieve-then-answer over a persisted index.

use super::QueryEngine;
use crate::error::Result;
use crate::index::VectorIndex;
use crate::llm::ChatModel;
use crate::vector_store::SearchResult;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Answer returned when retrieval finds nothing.
pub const NO_CONTEXT_ANSWER: &str =
    "I couldn't find any relevant information in the indexed content for this question.";

const SYSTEM_PROMPT: &str = "You answer questions using only the provided context. \
If the context does not contain the answer, say so. Be concise.";

/// Answers questions from the chunks most similar to the question.
pub struct RetrieverQueryEngine {
    index: Arc<VectorIndex>,
    model: Arc<dyn ChatModel>,
    top_k: usize,
    min_score: Option<f32>,
}

impl RetrieverQueryEngine {
    pub fn new(index: Arc<VectorIndex>, model: Arc<dyn ChatModel>, top_k: usize) -> Self {
        Self {
            index,
            model,
            top_k: top_k.max(1),
            min_score: None,
        }
    }

    /// Drop retrieved chunks scoring below `min_score`.
    pub fn with_min_score(mut self, min_score: f32) -> Self {
        self.min_score = Some(min_score);
        self
    }
}

/// Number each chunk and tag it with its origin.
fn format_context(results: &[SearchResult]) -> String {
    results
        .iter()
        .enumerate()
        .map(|(i, r)| format!("[{}] ({})\n{}", i + 1, r.chunk.citation(), r.chunk.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[async_trait]
impl QueryEngine for RetrieverQueryEngine {
    #[instrument(skip(self), fields(index = %self.index.name()))]
    async fn query(&self, input: &str) -> Result<String> {
        let results = match self.min_score {
            Some(min) => {
                self.index
                    .retrieve_with_threshold(input, self.top_k, min)
                    .await?
            }
            None => self.index.retrieve(input, self.top_k).await?,
        };

        if results.is_empty() {
            return Ok(NO_CONTEXT_ANSWER.to_string());
        }
        debug!("Answering from {} chunks", results.len());

        let user = format!(
            "Context:\n{}\n\nQuestion: {}",
            format_context(&results),
            input
        );
        self.model.complete(SYSTEM_PROMPT, &user).await
    }
}
