//! Text documents fed to the index builder.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One text-bearing document, such as a PDF page or a whole transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceDocument {
    /// Extracted text.
    pub text: String,
    /// Name of the file the text came from.
    pub file_name: String,
    /// Page label, for paginated sources.
    pub page_label: Option<String>,
}

impl SourceDocument {
    pub fn new(text: String, file_name: String, page_label: Option<String>) -> Self {
        Self {
            text,
            file_name,
            page_label,
        }
    }
}

/// Ordered collection of documents from one source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentSet {
    documents: Vec<SourceDocument>,
}

impl DocumentSet {
    pub fn new(documents: Vec<SourceDocument>) -> Self {
        Self { documents }
    }

    /// Read a transcript file as a single document.
    pub fn from_transcript(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::new(vec![SourceDocument::new(
            text,
            file_name_of(path),
            None,
        )]))
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SourceDocument> {
        self.documents.iter()
    }
}

impl IntoIterator for DocumentSet {
    type Item = SourceDocument;
    type IntoIter = std::vec::IntoIter<SourceDocument>;

    fn into_iter(self) -> Self::IntoIter {
        self.documents.into_iter()
    }
}

pub(crate) fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
