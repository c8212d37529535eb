//! Question answering over a loaded source.
//!
//! Tabular sources are answered by [`TableQueryEngine`], which has the model
//! plan a structured query and runs it locally. Indexed sources are answered
//! by [`RetrieverQueryEngine`], which retrieves similar chunks and has the
//! model answer from them.

mod plan;
mod retriever;
mod table;

pub use plan::{Aggregate, AggregateOp, Filter, FilterOp, SortSpec, TablePlan};
pub use retriever::{RetrieverQueryEngine, NO_CONTEXT_ANSWER};
pub use table::TableQueryEngine;

use crate::error::Result;
use async_trait::async_trait;

/// Anything that can answer a natural-language question with text.
#[async_trait]
pub trait QueryEngine: Send + Sync {
    async fn query(&self, input: &str) -> Result<String>;
}

/// Slice out the JSON object or array embedded in a model reply.
pub(crate) fn extract_json(text: &str) -> Option<&str> {
    let start = text.find(['{', '['])?;
    let closer = if text[start..].starts_with('{') { '}' } else { ']' };
    let end = text.rfind(closer)?;
    (end > start).then(|| &text[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_from_fenced_reply() {
        let reply = "Here is the plan:\n```json\n{\"limit\": 3}\n```\nDone.";
        assert_eq!(extract_json(reply), Some("{\"limit\": 3}"));
    }

    #[test]
    fn test_extract_json_missing() {
        assert_eq!(extract_json("no json here"), None);
        assert_eq!(extract_json("} backwards {"), None);
    }
}
