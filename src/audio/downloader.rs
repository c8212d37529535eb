//! Audio download through yt-dlp.

use crate::error::{DocQueryError, Result};
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{info, instrument};

/// Capability that fetches the audio track of a remote video.
#[async_trait]
pub trait AudioDownloader: Send + Sync {
    /// Download the best audio-only stream of `url` to exactly `target`,
    /// replacing any existing file.
    async fn download(&self, url: &str, target: &Path) -> Result<()>;
}

/// Downloader backed by the `yt-dlp` executable.
#[derive(Debug, Clone, Default)]
pub struct YtDlpDownloader;

impl YtDlpDownloader {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AudioDownloader for YtDlpDownloader {
    #[instrument(skip(self), fields(target = %target.display()))]
    async fn download(&self, url: &str, target: &Path) -> Result<()> {
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }

        info!("Downloading audio from {}", url);

        let result = Command::new("yt-dlp")
            .arg("--format").arg("bestaudio[ext=m4a]/bestaudio")
            .arg("--output").arg(target)
            .arg("--force-overwrites")
            .arg("--no-playlist")
            .arg("--quiet")
            .arg("--no-warnings")
            .arg(url)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await;

        let output = match result {
            Ok(o) => o,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(DocQueryError::ToolNotFound("yt-dlp".into()));
            }
            Err(e) => {
                return Err(DocQueryError::AudioDownload(format!("yt-dlp execution failed: {e}")));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DocQueryError::AudioDownload(format!("yt-dlp failed: {stderr}")));
        }

        if !target.exists() {
            return Err(DocQueryError::AudioDownload(
                "Audio file not found after download".into(),
            ));
        }

        Ok(())
    }
}
