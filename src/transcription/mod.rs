//! Speech-to-text for remote videos.
//!
//! [`MediaTranscriber`] drives the whole YouTube path: download the audio
//! track, transcribe it, and persist the transcript as plain UTF-8 text at a
//! fixed location under the save directory. Both later stages are
//! pluggable so either can be replaced by a local or hosted service.

mod api;
mod local;

pub use api::ApiTranscriber;
pub use local::LocalWhisperTranscriber;

use crate::audio::{canonical_watch_url, extract_video_id, AudioDownloader, YtDlpDownloader};
use crate::config::{Settings, TranscriptionProvider};
use crate::error::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// File name of the downloaded audio inside the save directory.
pub const AUDIO_FILE_NAME: &str = "audio.mp4";

/// File name of the transcript inside the save directory.
pub const TRANSCRIPT_FILE_NAME: &str = "transcript.txt";

/// Trait for transcription services.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe an audio file into a single block of text.
    async fn transcribe(&self, audio_path: &Path) -> Result<String>;
}

/// Build the transcriber selected in the settings.
pub fn create_transcriber(settings: &Settings) -> Result<Arc<dyn Transcriber>> {
    let transcriber: Arc<dyn Transcriber> = match settings.transcription.provider {
        TranscriptionProvider::Local => Arc::new(LocalWhisperTranscriber::new(
            &settings.transcription.model_size,
        )),
        TranscriptionProvider::Api => Arc::new(ApiTranscriber::from_settings(
            &settings.transcription,
        )?),
    };
    Ok(transcriber)
}

/// Download-then-transcribe pipeline for a single video.
pub struct MediaTranscriber {
    downloader: Arc<dyn AudioDownloader>,
    transcriber: Arc<dyn Transcriber>,
}

impl MediaTranscriber {
    pub fn new(downloader: Arc<dyn AudioDownloader>, transcriber: Arc<dyn Transcriber>) -> Self {
        Self {
            downloader,
            transcriber,
        }
    }

    /// Pipeline using yt-dlp and the configured transcriber.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Ok(Self::new(
            Arc::new(YtDlpDownloader::new()),
            create_transcriber(settings)?,
        ))
    }

    /// Fetch the audio of `url` into `save_dir`, transcribe it, and return the
    /// path of the written transcript.
    ///
    /// Both `audio.mp4` and `transcript.txt` are overwritten on every run.
    #[instrument(skip(self), fields(save_dir = %save_dir.display()))]
    pub async fn download_and_transcribe(&self, url: &str, save_dir: &Path) -> Result<PathBuf> {
        let video_id = extract_video_id(url)?;
        std::fs::create_dir_all(save_dir)?;

        let audio_path = save_dir.join(AUDIO_FILE_NAME);
        self.downloader
            .download(&canonical_watch_url(&video_id), &audio_path)
            .await?;

        self.transcribe_file(&audio_path, save_dir).await
    }

    /// Transcribe an already downloaded audio file into `save_dir`.
    pub async fn transcribe_file(&self, audio_path: &Path, save_dir: &Path) -> Result<PathBuf> {
        info!("Transcribing {}", audio_path.display());
        let text = self.transcriber.transcribe(audio_path).await?;
        if text.trim().is_empty() {
            warn!("Transcriber returned no speech for {}", audio_path.display());
        }

        let transcript_path = save_dir.join(TRANSCRIPT_FILE_NAME);
        tokio::fs::write(&transcript_path, text.trim()).await?;
        info!(
            "Wrote {} chars of transcript to {}",
            text.trim().len(),
            transcript_path.display()
        );

        Ok(transcript_path)
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{FakeDownloader, FakeTranscriber};
    use super::*;
    use crate::error::DocQueryError;

    #[tokio::test]
    async fn test_pipeline_writes_transcript_at_fixed_path() {
        let dir = tempfile::tempdir().unwrap();
        let downloader = Arc::new(FakeDownloader::default());
        let pipeline = MediaTranscriber::new(
            downloader.clone(),
            Arc::new(FakeTranscriber(" Never gonna give you up. \n")),
        );

        let path = pipeline
            .download_and_transcribe("https://youtu.be/dQw4w9WgXcQ?t=42", dir.path())
            .await
            .unwrap();

        assert_eq!(path, dir.path().join(TRANSCRIPT_FILE_NAME));
        assert!(dir.path().join(AUDIO_FILE_NAME).exists());
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "Never gonna give you up."
        );
        assert_eq!(
            downloader.requested.lock().unwrap().as_slice(),
            ["https://www.youtube.com/watch?v=dQw4w9WgXcQ"]
        );
    }

    #[tokio::test]
    async fn test_second_run_overwrites_transcript() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(TRANSCRIPT_FILE_NAME), "stale").unwrap();

        let pipeline = MediaTranscriber::new(
            Arc::new(FakeDownloader::default()),
            Arc::new(FakeTranscriber("fresh")),
        );
        let path = pipeline
            .download_and_transcribe("dQw4w9WgXcQ", dir.path())
            .await
            .unwrap();

        assert_eq!(std::fs::read_to_string(path).unwrap(), "fresh");
    }

    #[tokio::test]
    async fn test_invalid_url_never_downloads() {
        let dir = tempfile::tempdir().unwrap();
        let downloader = Arc::new(FakeDownloader::default());
        let pipeline = MediaTranscriber::new(downloader.clone(), Arc::new(FakeTranscriber("x")));

        let err = pipeline
            .download_and_transcribe("https://vimeo.com/12345", dir.path())
            .await
            .unwrap_err();

        assert!(matches!(err, DocQueryError::InvalidInput(_)));
        assert!(downloader.requested.lock().unwrap().is_empty());
        assert!(!dir.path().join(TRANSCRIPT_FILE_NAME).exists());
    }
}
