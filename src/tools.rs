//! Query engines exposed to the agent as named tools.

use crate::error::{DocQueryError, Result};
use crate::query::QueryEngine;
use crate::source::SourceKind;
use async_openai::types::{ChatCompletionTool, ChatCompletionToolType, FunctionObject};
use std::sync::Arc;
use tracing::debug;

/// Default tool name for a source kind.
pub fn default_tool_name(kind: SourceKind) -> &'static str {
    match kind {
        SourceKind::Csv => "csv_data",
        SourceKind::Excel => "excel_data",
        SourceKind::Pdf => "pdf_data",
        SourceKind::YouTube => "youtube_data",
    }
}

/// Default tool description for a source kind.
pub fn default_tool_description(kind: SourceKind) -> &'static str {
    match kind {
        SourceKind::Csv => "This provides information from the CSV file.",
        SourceKind::Excel => "This provides information from the Excel file.",
        SourceKind::Pdf => "This provides information from the PDF file.",
        SourceKind::YouTube => "This provides information from the transcribed YouTube video.",
    }
}

/// A named, described query engine.
#[derive(Clone)]
pub struct QueryTool {
    name: String,
    description: String,
    engine: Arc<dyn QueryEngine>,
}

impl QueryTool {
    pub fn new(name: &str, description: &str, engine: Arc<dyn QueryEngine>) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            engine,
        }
    }

    /// Tool with the default name and description for `kind`.
    pub fn for_kind(kind: SourceKind, engine: Arc<dyn QueryEngine>) -> Self {
        Self::new(default_tool_name(kind), default_tool_description(kind), engine)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub async fn answer(&self, input: &str) -> Result<String> {
        self.engine.query(input).await
    }

    fn definition(&self) -> ChatCompletionTool {
        ChatCompletionTool {
            r#type: ChatCompletionToolType::Function,
            function: FunctionObject {
                name: self.name.clone(),
                description: Some(self.description.clone()),
                parameters: Some(serde_json::json!({
                    "type": "object",
                    "properties": {
                        "input": {
                            "type": "string",
                            "description": "A detailed plain text question to answer from this source"
                        }
                    },
                    "required": ["input"]
                })),
                strict: None,
            },
        }
    }
}

impl std::fmt::Debug for QueryTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryTool")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Ordered set of tools with unique names.
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<QueryTool>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tool. A second tool with an existing name is rejected.
    pub fn register(&mut self, tool: QueryTool) -> Result<()> {
        if self.get(tool.name()).is_some() {
            return Err(DocQueryError::DuplicateTool(tool.name().to_string()));
        }
        debug!("Registered tool {}", tool.name());
        self.tools.push(tool);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&QueryTool> {
        self.tools.iter().find(|t| t.name() == name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// Function definitions offered to the model, in registration order.
    pub fn definitions(&self) -> Vec<ChatCompletionTool> {
        self.tools.iter().map(QueryTool::definition).collect()
    }

    /// Run the tool `name` with JSON `arguments`.
    ///
    /// An unknown name or unusable arguments come back as `Ok` text for the
    /// model to read. Errors from the tool's engine are returned as `Err`.
    pub async fn call(&self, name: &str, arguments: &str) -> Result<String> {
        let Some(tool) = self.get(name) else {
            return Ok(format!(
                "Unknown tool '{}'. Available tools: {}",
                name,
                self.names().join(", ")
            ));
        };

        match parse_input(arguments) {
            Some(input) => tool.answer(&input).await,
            None => Ok(format!(
                "Invalid arguments for '{}': expected {{\"input\": \"<question>\"}}, got {}",
                name, arguments
            )),
        }
    }
}

/// Pull the question out of tool-call arguments.
fn parse_input(arguments: &str) -> Option<String> {
    let value: serde_json::Value = match serde_json::from_str(arguments) {
        Ok(v) => v,
        Err(_) => {
            let raw = arguments.trim();
            return (!raw.is_empty()).then(|| raw.to_string());
        }
    };

    match value {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Object(map) => match map.get("input") {
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            Some(_) => None,
            // Models sometimes rename the single parameter
            None => {
                let mut strings = map.values().filter_map(|v| v.as_str());
                match (strings.next(), strings.next()) {
                    (Some(only), None) => Some(only.to_string()),
                    _ => None,
                }
            }
        },
        _ => None,
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{BrokenEngine, EchoEngine};
    use super::*;

    #[test]
    fn test_duplicate_name_is_rejected() {
        let mut registry = ToolRegistry::new();
        registry
            .register(QueryTool::for_kind(SourceKind::Pdf, Arc::new(EchoEngine::default())))
            .unwrap();

        let err = registry
            .register(QueryTool::new("pdf_data", "another", Arc::new(EchoEngine::default())))
            .unwrap_err();
        assert!(matches!(err, DocQueryError::DuplicateTool(ref n) if n == "pdf_data"));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("pdf_data").unwrap().description(), "This provides information from the PDF file.");
    }

    #[test]
    fn test_definitions_expose_single_input() {
        let mut registry = ToolRegistry::new();
        registry
            .register(QueryTool::for_kind(SourceKind::Csv, Arc::new(EchoEngine::default())))
            .unwrap();
        registry
            .register(QueryTool::for_kind(SourceKind::YouTube, Arc::new(EchoEngine::default())))
            .unwrap();

        let defs = registry.definitions();
        assert_eq!(defs.len(), 2);
        assert_eq!(defs[0].function.name, "csv_data");
        assert_eq!(defs[1].function.name, "youtube_data");
        let params = defs[0].function.parameters.as_ref().unwrap();
        assert_eq!(params["required"], serde_json::json!(["input"]));
    }

    #[tokio::test]
    async fn test_call_dispatches_by_name() {
        let engine = Arc::new(EchoEngine::default());
        let mut registry = ToolRegistry::new();
        registry
            .register(QueryTool::new("csv_data", "rows", engine.clone()))
            .unwrap();

        let out = registry.call("csv_data", r#"{"input": "how many rows?"}"#).await.unwrap();
        assert_eq!(out, "echo: how many rows?");

        let out = registry.call("nope", "{}").await.unwrap();
        assert!(out.starts_with("Unknown tool 'nope'"));

        let out = registry.call("csv_data", r#"{"input": 3}"#).await.unwrap();
        assert!(out.starts_with("Invalid arguments"));
        assert_eq!(engine.questions.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_engine_errors_propagate() {
        let mut registry = ToolRegistry::new();
        registry
            .register(QueryTool::new("pdf_data", "docs", Arc::new(BrokenEngine)))
            .unwrap();

        let err = registry.call("pdf_data", r#"{"input": "x"}"#).await.unwrap_err();
        assert!(matches!(err, DocQueryError::Api(_)));
    }

    #[test]
    fn test_parse_input_variants() {
        assert_eq!(parse_input(r#"{"input": "a"}"#).as_deref(), Some("a"));
        assert_eq!(parse_input(r#"{"query": "b"}"#).as_deref(), Some("b"));
        assert_eq!(parse_input(r#""c""#).as_deref(), Some("c"));
        assert_eq!(parse_input("plain words").as_deref(), Some("plain words"));
        assert_eq!(parse_input(r#"{"a": "x", "b": "y"}"#), None);
        assert_eq!(parse_input("{}"), None);
    }
}
