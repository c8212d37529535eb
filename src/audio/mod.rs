//! Audio acquisition for remote media.

mod downloader;
mod youtube;

pub use downloader::{AudioDownloader, YtDlpDownloader};
pub use youtube::{canonical_watch_url, extract_video_id};
