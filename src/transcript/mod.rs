//! Transcript retrieval.
//!
//! Provides a trait-based interface over the external caption service, plus
//! the URL parsing that turns a user-supplied link into a video ID.

mod youtube;

pub use youtube::{extract_video_id, YoutubeTranscripts};

use crate::error::{Result, TubeQaError};
use async_trait::async_trait;

/// Trait for transcript sources.
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// Fetch the full transcript text of a video.
    ///
    /// Returns `TranscriptUnavailable` when the video has no usable captions
    /// or the service cannot be reached.
    async fn fetch(&self, video_id: &str) -> Result<String>;
}

/// Join caption segments into a single transcript with single-space separators.
///
/// A transcript with no visible text is `TranscriptUnavailable`.
pub fn join_segments<'a>(
    video_id: &str,
    segments: impl IntoIterator<Item = &'a str>,
) -> Result<String> {
    let transcript = segments.into_iter().collect::<Vec<_>>().join(" ");
    if transcript.trim().is_empty() {
        return Err(TubeQaError::TranscriptUnavailable(format!(
            "{}: transcript is empty",
            video_id
        )));
    }
    Ok(transcript)
}
