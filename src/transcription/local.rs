//! Local Whisper transcription through the `whisper` command-line tool.

use super::Transcriber;
use crate::error::{DocQueryError, Result};
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, instrument};

/// Transcriber that shells out to an installed `whisper` executable.
#[derive(Debug, Clone)]
pub struct LocalWhisperTranscriber {
    executable: String,
    model_size: String,
}

impl LocalWhisperTranscriber {
    pub fn new(model_size: &str) -> Self {
        Self {
            executable: "whisper".to_string(),
            model_size: model_size.to_string(),
        }
    }

    /// Use a different executable name or path.
    pub fn with_executable(mut self, executable: &str) -> Self {
        self.executable = executable.to_string();
        self
    }
}

#[async_trait]
impl Transcriber for LocalWhisperTranscriber {
    #[instrument(skip(self), fields(audio_path = %audio_path.display(), model = %self.model_size))]
    async fn transcribe(&self, audio_path: &Path) -> Result<String> {
        let out_dir = tempfile::tempdir()?;

        let result = Command::new(&self.executable)
            .arg(audio_path)
            .arg("--model").arg(&self.model_size)
            .arg("--output_format").arg("txt")
            .arg("--output_dir").arg(out_dir.path())
            .arg("--verbose").arg("False")
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await;

        let output = match result {
            Ok(o) => o,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(DocQueryError::ToolNotFound(self.executable.clone()));
            }
            Err(e) => {
                return Err(DocQueryError::Transcription(format!(
                    "{} execution failed: {e}",
                    self.executable
                )));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DocQueryError::Transcription(format!(
                "{} failed: {stderr}",
                self.executable
            )));
        }

        let stem = audio_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("audio");
        let text_path = out_dir.path().join(format!("{stem}.txt"));
        let raw = tokio::fs::read_to_string(&text_path).await.map_err(|e| {
            DocQueryError::Transcription(format!(
                "No transcript produced at {}: {e}",
                text_path.display()
            ))
        })?;

        debug!("Read {} bytes of whisper output", raw.len());
        Ok(join_segments(&raw))
    }
}

/// Whisper's txt output holds one segment per line; join them into prose.
fn join_segments(raw: &str) -> String {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_segments() {
        let raw = " Hello there.\n\n General Kenobi.  \n";
        assert_eq!(join_segments(raw), "Hello there. General Kenobi.");
        assert_eq!(join_segments("\n\n"), "");
    }

    #[tokio::test]
    async fn test_missing_executable_is_tool_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let audio = dir.path().join("audio.mp4");
        std::fs::write(&audio, b"not really audio").unwrap();

        let transcriber =
            LocalWhisperTranscriber::new("base").with_executable("docquery-no-such-whisper");
        let err = transcriber.transcribe(&audio).await.unwrap_err();

        assert!(matches!(err, DocQueryError::ToolNotFound(name) if name == "docquery-no-such-whisper"));
    }
}
