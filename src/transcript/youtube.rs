//! YouTube transcript source.

use super::{join_segments, TranscriptSource};
use crate::config::TranscriptSettings;
use crate::error::{Result, TubeQaError};
use async_trait::async_trait;
use regex::Regex;
use std::sync::OnceLock;
use tracing::{debug, info, instrument, warn};
use yt_transcript_rs::YouTubeTranscriptApi;

/// Recognized URL shapes, tried in order. The first capture wins.
const VIDEO_ID_PATTERNS: [&str; 3] = [
    r"watch\?v=([a-zA-Z0-9_-]+)",
    r"youtu\.be/([a-zA-Z0-9_-]+)",
    r"embed/([a-zA-Z0-9_-]+)",
];

fn video_id_regexes() -> &'static [Regex] {
    static REGEXES: OnceLock<Vec<Regex>> = OnceLock::new();
    REGEXES.get_or_init(|| {
        VIDEO_ID_PATTERNS
            .iter()
            .filter_map(|pattern| Regex::new(pattern).ok())
            .collect()
    })
}

/// Extract a video ID from a YouTube URL.
///
/// Accepts `watch?v=ID`, `youtu.be/ID` and `embed/ID` anywhere in the input.
/// The ID is not checked against YouTube; a bogus ID fails later at fetch time.
pub fn extract_video_id(url: &str) -> Option<String> {
    video_id_regexes()
        .iter()
        .find_map(|re| re.captures(url))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Transcript source backed by YouTube captions.
pub struct YoutubeTranscripts {
    api: YouTubeTranscriptApi,
    languages: Vec<String>,
    preserve_formatting: bool,
}

impl YoutubeTranscripts {
    /// Create a transcript source with the given language preferences.
    pub fn new(settings: &TranscriptSettings) -> Result<Self> {
        let api = YouTubeTranscriptApi::new(None, None, None).map_err(|e| {
            TubeQaError::Config(format!("Failed to initialize YouTube transcript API: {}", e))
        })?;

        Ok(Self {
            api,
            languages: settings.languages.clone(),
            preserve_formatting: settings.preserve_formatting,
        })
    }
}

#[async_trait]
impl TranscriptSource for YoutubeTranscripts {
    #[instrument(skip(self))]
    async fn fetch(&self, video_id: &str) -> Result<String> {
        let languages: Vec<&str> = self.languages.iter().map(String::as_str).collect();

        let fetched = self
            .api
            .fetch_transcript(video_id, &languages, self.preserve_formatting)
            .await
            .map_err(|e| {
                warn!("Error fetching transcript for {}: {}", video_id, e);
                TubeQaError::TranscriptUnavailable(format!("{}: {}", video_id, e))
            })?;

        debug!(
            "Fetched {} caption segments ({}, generated: {})",
            fetched.snippets.len(),
            fetched.language_code,
            fetched.is_generated
        );

        let transcript = join_segments(video_id, fetched.snippets.iter().map(|s| s.text.as_str()))
            .inspect_err(|e| warn!("{}", e))?;

        info!("Transcript fetched successfully ({} chars)", transcript.chars().count());
        Ok(transcript)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_video_id() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            extract_video_id("https://youtu.be/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            extract_video_id("https://www.youtube.com/embed/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );

        assert_eq!(extract_video_id("not a url"), None);
        assert_eq!(extract_video_id(""), None);
        assert_eq!(extract_video_id("https://vimeo.com/12345"), None);
    }

    #[test]
    fn test_extract_stops_at_query_params() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=abc_DEF-123&t=42s"),
            Some("abc_DEF-123".to_string())
        );
        assert_eq!(
            extract_video_id("https://youtu.be/xyz?si=share"),
            Some("xyz".to_string())
        );
    }

    #[test]
    fn test_pattern_order() {
        // watch?v= is tried before embed/, regardless of position in the input.
        assert_eq!(
            extract_video_id("https://example.com/embed/first?next=watch?v=second"),
            Some("second".to_string())
        );
    }
}
