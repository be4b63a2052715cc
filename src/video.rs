//! YouTube reference parsing and validation.
//!
//! Inputs are validated here, before any external call is made, so a bad
//! URL or channel id never costs API quota.

use crate::error::{Result, SvarError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Matches full and shortened YouTube video URLs from the start of the
/// input and captures the 11-character video id. Bare ids are deliberately
/// not accepted: an arbitrary 11-character string is indistinguishable from
/// a typo.
fn video_url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^(?:https?://)?(?:www\.)?(?:youtube\.com/watch\?v=|youtu\.be/|youtube\.com/embed/|youtube\.com/v/)([A-Za-z0-9_-]{11})",
        )
        .expect("Invalid regex")
    })
}

/// Channel ids are exactly 24 characters and start with "UC".
fn channel_id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^UC[A-Za-z0-9_-]{22}$").expect("Invalid regex"))
}

/// An 11-character YouTube video identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VideoId(String);

impl VideoId {
    /// Extract a video id from a full or shortened YouTube URL.
    pub fn from_url(input: &str) -> Result<Self> {
        video_url_regex()
            .captures(input.trim())
            .and_then(|caps| caps.get(1))
            .map(|m| Self(m.as_str().to_string()))
            .ok_or_else(|| {
                SvarError::InvalidInput(format!(
                    "'{}' is not a valid YouTube video URL",
                    input.trim()
                ))
            })
    }

    /// Accept a bare 11-character id, e.g. straight from yt-dlp output.
    ///
    /// User-supplied input goes through [`VideoId::from_url`] instead, which
    /// insists on a URL shape.
    pub fn from_id(input: &str) -> Result<Self> {
        static RE: OnceLock<Regex> = OnceLock::new();
        let re = RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]{11}$").expect("Invalid regex"));
        if re.is_match(input) {
            Ok(Self(input.to_string()))
        } else {
            Err(SvarError::InvalidInput(format!(
                "'{}' is not a valid video id",
                input
            )))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Canonical watch URL for this video.
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.0)
    }
}

impl std::fmt::Display for VideoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A 24-character YouTube channel identifier ("UC" prefix).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelId(String);

impl ChannelId {
    /// Validate a channel id.
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        if channel_id_regex().is_match(input) {
            Ok(Self(input.to_string()))
        } else {
            Err(SvarError::InvalidInput(format!(
                "'{}' is not a valid channel id (expected 24 characters starting with 'UC')",
                input
            )))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// URL of the channel's videos tab.
    pub fn videos_url(&self) -> String {
        format!("https://www.youtube.com/channel/{}/videos", self.0)
    }
}

impl std::fmt::Display for ChannelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a loaded session points at: a single video or a whole channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoRef {
    Video(VideoId),
    Channel(ChannelId),
}

impl std::fmt::Display for VideoRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VideoRef::Video(id) => write!(f, "{}", id.watch_url()),
            VideoRef::Channel(id) => write!(f, "channel {}", id),
        }
    }
}
