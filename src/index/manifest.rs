//! Index manifest stored next to the vectors.

use crate::error::{DocQueryError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Description of how a persisted index was built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexManifest {
    pub name: String,
    pub embedding_model: String,
    pub dimensions: usize,
    pub chunk_count: usize,
    pub document_count: usize,
    pub created_at: DateTime<Utc>,
}

impl IndexManifest {
    pub fn new(
        name: &str,
        embedding_model: &str,
        dimensions: usize,
        chunk_count: usize,
        document_count: usize,
    ) -> Self {
        Self {
            name: name.to_string(),
            embedding_model: embedding_model.to_string(),
            dimensions,
            chunk_count,
            document_count,
            created_at: Utc::now(),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| DocQueryError::Index(format!("Failed to serialize manifest: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
