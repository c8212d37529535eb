//! YouTube URL recognition.

use crate::error::{DocQueryError, Result};
use regex::Regex;
use std::sync::OnceLock;

const ALLOWED_HOSTS: &[&str] = &[
    "youtube.com",
    "www.youtube.com",
    "m.youtube.com",
    "music.youtube.com",
    "youtu.be",
];

fn video_id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // Watch, short-link, embed, and shorts URLs, or a bare 11-character ID
        Regex::new(
            r"(?x)
            (?:
                (?:https?://)?
                (?:www\.|m\.|music\.)?
                (?:youtube\.com/watch\?(?:.*&)?v=|youtu\.be/|youtube\.com/embed/|youtube\.com/v/|youtube\.com/shorts/)
                ([a-zA-Z0-9_-]{11})
            )
            |
            ^([a-zA-Z0-9_-]{11})$
        ",
        )
        .expect("video id pattern is valid")
    })
}

/// Extract the video ID from a YouTube URL or bare ID.
pub fn extract_video_id(input: &str) -> Result<String> {
    let input = input.trim();

    if input.contains("://") {
        let parsed = url::Url::parse(input)
            .map_err(|e| DocQueryError::InvalidInput(format!("Invalid URL {}: {}", input, e)))?;
        let host = parsed.host_str().unwrap_or_default();
        if !ALLOWED_HOSTS.contains(&host) {
            return Err(DocQueryError::InvalidInput(format!(
                "Not a YouTube URL: {}",
                input
            )));
        }
    }

    video_id_regex()
        .captures(input)
        .and_then(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| {
            DocQueryError::InvalidInput(format!("Invalid YouTube video ID or URL: {}", input))
        })
}

/// Canonical watch URL for a video ID.
pub fn canonical_watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_video_id() {
        for input in [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://youtube.com/watch?feature=share&v=dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ",
            "https://youtube.com/embed/dQw4w9WgXcQ",
            "https://www.youtube.com/shorts/dQw4w9WgXcQ",
            "  dQw4w9WgXcQ ",
        ] {
            assert_eq!(extract_video_id(input).unwrap(), "dQw4w9WgXcQ", "{}", input);
        }
    }

    #[test]
    fn test_rejects_other_inputs() {
        assert!(extract_video_id("not-a-video-id").is_err());
        assert!(extract_video_id("").is_err());
        assert!(extract_video_id("https://vimeo.com/watch?v=dQw4w9WgXcQ").is_err());
    }

    #[test]
    fn test_canonical_url() {
        assert_eq!(
            canonical_watch_url("dQw4w9WgXcQ"),
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
        );
    }
}
