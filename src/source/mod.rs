//! Source loading for tabular and document files.
//!
//! Loaders are plain fallible functions. [`load`] is the non-fatal boundary
//! used by the session: it reports the failure and yields `None` so the
//! caller can decide how to continue.

mod document;
mod pdf;
mod table;

pub use document::{DocumentSet, SourceDocument};
pub use pdf::load_pdf;
pub use table::{load_csv, load_excel, Cell, StructuredTable};

#[cfg(test)]
pub(crate) use pdf::testing as pdf_testing;

use crate::cli::Output;
use crate::error::{DocQueryError, Result};
use std::path::Path;
use tracing::warn;

/// Which loader or transcriber path a session uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Csv,
    Excel,
    Pdf,
    YouTube,
}

impl SourceKind {
    /// Human-readable label used in prompts and messages.
    pub fn label(&self) -> &'static str {
        match self {
            SourceKind::Csv => "CSV",
            SourceKind::Excel => "Excel",
            SourceKind::Pdf => "PDF",
            SourceKind::YouTube => "YouTube",
        }
    }

    /// Tabular sources are queried directly and never indexed.
    pub fn is_tabular(&self) -> bool {
        matches!(self, SourceKind::Csv | SourceKind::Excel)
    }

    /// Prompt asking for the location of this kind of source.
    pub fn input_prompt(&self) -> String {
        match self {
            SourceKind::YouTube => "Please enter the YouTube video URL: ".to_string(),
            other => format!("Please enter the path to your {} file: ", other.label()),
        }
    }
}

impl std::str::FromStr for SourceKind {
    type Err = DocQueryError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(SourceKind::Csv),
            "excel" | "xlsx" | "xls" => Ok(SourceKind::Excel),
            "pdf" => Ok(SourceKind::Pdf),
            "youtube" => Ok(SourceKind::YouTube),
            _ => Err(DocQueryError::InvalidSourceKind(s.trim().to_string())),
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Content produced by a file loader.
#[derive(Debug, Clone)]
pub enum LoadedSource {
    Table(StructuredTable),
    Documents(DocumentSet),
}

/// Load a tabular file (CSV or Excel).
pub fn load_table(kind: SourceKind, path: &Path) -> Result<StructuredTable> {
    ensure_exists(path)?;

    match kind {
        SourceKind::Csv => load_csv(path),
        SourceKind::Excel => load_excel(path),
        other => Err(DocQueryError::InvalidInput(format!(
            "{} is not a tabular source",
            other
        ))),
    }
}

/// Load a file of the given kind, propagating every failure.
pub fn try_load(kind: SourceKind, path: &Path) -> Result<LoadedSource> {
    match kind {
        SourceKind::Csv | SourceKind::Excel => load_table(kind, path).map(LoadedSource::Table),
        SourceKind::Pdf => {
            ensure_exists(path)?;
            load_pdf(path).map(LoadedSource::Documents)
        }
        SourceKind::YouTube => Err(DocQueryError::InvalidInput(
            "YouTube sources are transcribed, not loaded from a file".to_string(),
        )),
    }
}

fn ensure_exists(path: &Path) -> Result<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(DocQueryError::FileNotFound(path.display().to_string()))
    }
}

/// Load a file of the given kind, reporting failures instead of returning them.
pub fn load(kind: SourceKind, path: &Path) -> Option<LoadedSource> {
    match try_load(kind, path) {
        Ok(loaded) => Some(loaded),
        Err(e) => {
            warn!("Failed to load {} source {}: {}", kind, path.display(), e);
            Output::error(&e.to_string());
            None
        }
    }
}

/// Wrap a parser failure for `kind`.
pub(crate) fn parse_error(kind: SourceKind, err: impl std::fmt::Display) -> DocQueryError {
    DocQueryError::SourceParse {
        kind: kind.label().to_string(),
        message: err.to_string(),
    }
}
