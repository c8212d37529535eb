//! Pre-flight checks before a session starts.
//!
//! Validates that credentials and external tools are available before
//! loading, downloading or indexing anything.

use crate::config::{Settings, TranscriptionProvider};
use crate::error::{DocQueryError, Result};
use crate::openai::read_api_key;
use crate::source::SourceKind;
use std::process::Command;

/// Run pre-flight checks for a session over `kind`.
///
/// Every session needs the reasoning model. Indexed sources also need the
/// embedding model, and YouTube needs the downloader and a transcriber.
pub fn check(kind: SourceKind, settings: &Settings) -> Result<()> {
    read_api_key(&settings.llm.api_key_env)?;

    if !kind.is_tabular() {
        read_api_key(&settings.embedding.api_key_env)?;
    }

    if kind == SourceKind::YouTube {
        check_tool("yt-dlp")?;
        match settings.transcription.provider {
            TranscriptionProvider::Local => check_tool("whisper")?,
            TranscriptionProvider::Api => {
                read_api_key(&settings.transcription.api_key_env)?;
            }
        }
    }

    Ok(())
}

/// Check if an external tool is available.
fn check_tool(name: &str) -> Result<()> {
    // the whisper CLI has no version flag
    let check_arg = match name {
        "whisper" => "--help",
        _ => "--version",
    };
    match Command::new(name).arg(check_arg).output() {
        Ok(output) if output.status.success() => Ok(()),
        Ok(_) => Err(DocQueryError::ToolNotFound(format!(
            "{} is installed but not working correctly",
            name
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(DocQueryError::ToolNotFound(name.to_string()))
        }
        Err(e) => Err(DocQueryError::ToolNotFound(format!("{}: {}", name, e))),
    }
}
