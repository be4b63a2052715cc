//! Transcript acquisition for Svar.
//!
//! Provides a trait-based interface for transcript sources and the typed
//! failure modes of fetching a transcript. Unavailable transcripts are
//! expected, frequent outcomes, so they are modeled as values rather than
//! bubbled up as opaque failures.

mod youtube;

pub use youtube::YoutubeTranscriptSource;

use crate::error::Result;
use crate::video::{ChannelId, VideoId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single segment of a transcript, in source order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Spoken text of this segment.
    pub text: String,
    /// Start offset in seconds, if the source provides timing.
    pub start_seconds: Option<f64>,
    /// Duration in seconds, if the source provides timing.
    pub duration_seconds: Option<f64>,
}

impl TranscriptSegment {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            start_seconds: None,
            duration_seconds: None,
        }
    }

    pub fn with_timing(text: impl Into<String>, start_seconds: f64, duration_seconds: f64) -> Self {
        Self {
            text: text.into(),
            start_seconds: Some(start_seconds),
            duration_seconds: Some(duration_seconds),
        }
    }
}

/// An ordered sequence of transcript segments for one video.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Transcript {
    pub segments: Vec<TranscriptSegment>,
}

impl Transcript {
    pub fn new(segments: Vec<TranscriptSegment>) -> Self {
        Self { segments }
    }

    /// Concatenate all segments into one text, joined by single spaces.
    pub fn full_text(&self) -> String {
        self.segments
            .iter()
            .map(|s| s.text.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// True when the transcript carries no usable text.
    pub fn is_empty(&self) -> bool {
        self.segments.iter().all(|s| s.text.trim().is_empty())
    }
}

/// Why a transcript could not be acquired.
///
/// Each failure is terminal for the ingest call it occurred in; no retries
/// are performed at this layer.
#[derive(Error, Debug)]
pub enum AcquireError {
    #[error("Video {0} has no transcript. Try a video with captions.")]
    NoTranscript(String),

    #[error("Transcripts are disabled for video {0}. Try another video.")]
    TranscriptsDisabled(String),

    #[error("Not found or unreachable: {0}")]
    NotFound(String),

    #[error("Transcript acquisition failed: {0}")]
    Unknown(String),
}

/// A video discovered while listing a channel.
#[derive(Debug, Clone)]
pub struct VideoListing {
    pub video_id: VideoId,
    pub title: String,
}

/// Trait for transcript providers.
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// Fetch the transcript for a single video.
    async fn acquire(&self, video_id: &VideoId) -> std::result::Result<Transcript, AcquireError>;

    /// List videos belonging to a channel, newest first, up to `limit`.
    async fn list_channel_videos(
        &self,
        channel: &ChannelId,
        limit: usize,
    ) -> Result<Vec<VideoListing>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_text_joins_segments() {
        let transcript = Transcript::new(vec![
            TranscriptSegment::with_timing("hello", 0.0, 1.5),
            TranscriptSegment::with_timing(" world ", 1.5, 1.0),
        ]);
        assert_eq!(transcript.full_text(), "hello world");
        assert!(!transcript.is_empty());
    }

    #[test]
    fn test_empty_transcript() {
        assert!(Transcript::default().is_empty());
        assert_eq!(Transcript::default().full_text(), "");

        let blank = Transcript::new(vec![TranscriptSegment::new("   ")]);
        assert!(blank.is_empty());
    }
}
