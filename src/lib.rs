//! docquery - natural-language questions over tabular, document and video sources
//!
//! A console tool that loads a CSV, Excel, PDF or YouTube source, wraps it in
//! a query tool, and lets a tool-calling agent answer prompts about it.
//!
//! # Overview
//!
//! - CSV and Excel files become a [`source::StructuredTable`] queried through
//!   a model-written plan
//! - PDFs and YouTube transcripts are chunked, embedded and persisted as a
//!   named vector index that later runs load instead of rebuilding
//! - Each source is exposed to the agent as a [`tools::QueryTool`]
//! - A small web stub serves a landing page and echoes form posts
//!
//! # Architecture
//!
//! - `config` - Configuration management
//! - `source` - CSV, Excel and PDF loaders
//! - `audio` - YouTube audio download
//! - `transcription` - Speech-to-text and transcript persistence
//! - `chunking` - Word-window chunking
//! - `embedding` - Embedding generation
//! - `vector_store` - SQLite chunk storage and similarity search
//! - `index` - Named, persisted vector indexes
//! - `llm` - Chat model abstraction
//! - `query` - Query engines over tables and indexes
//! - `tools` - Query tools and the tool registry
//! - `agent` - Tool-calling agent loop
//! - `session` - Builds the tools for a session
//! - `web` - Web stub
//!
//! # Example
//!
//! ```rust,no_run
//! use docquery::agent::{Agent, Answerer};
//! use docquery::config::Settings;
//! use docquery::session::{Orchestrator, SessionConfig};
//! use docquery::source::SourceKind;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut orchestrator = Orchestrator::new(Settings::load()?);
//!     let config = SessionConfig::new(SourceKind::Csv, "sales.csv");
//!
//!     let tools = orchestrator.build_tools(&config).await?;
//!     let agent = Agent::new(orchestrator.model()?, tools);
//!     println!("{}", agent.answer("Which region sold the most?").await?);
//!
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod audio;
pub mod chunking;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod index;
pub mod llm;
pub mod openai;
pub mod query;
pub mod session;
pub mod source;
pub mod tools;
pub mod transcription;
pub mod vector_store;
pub mod web;

pub use error::{DocQueryError, Result};
