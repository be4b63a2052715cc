//! YouTube transcript source.
//!
//! Caption tracks are discovered through yt-dlp metadata and fetched over
//! HTTP in the `json3` format, which carries per-event timing.

use super::{AcquireError, Transcript, TranscriptSegment, TranscriptSource, VideoListing};
use crate::error::{Result, SvarError};
use crate::video::{ChannelId, VideoId};
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, instrument, warn};

/// Languages tried in order when picking a caption track.
const PREFERRED_LANGUAGES: [&str; 3] = ["en", "en-orig", "en-US"];

/// Transcript source backed by yt-dlp and the YouTube caption endpoints.
pub struct YoutubeTranscriptSource {
    http: reqwest::Client,
}

impl YoutubeTranscriptSource {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }

    /// Fetch video metadata (including caption track URLs) via yt-dlp.
    async fn fetch_metadata(&self, video_id: &VideoId) -> std::result::Result<Value, AcquireError> {
        let url = video_id.watch_url();

        let output = tokio::process::Command::new("yt-dlp")
            .args(["--dump-json", "--no-download", "--no-warnings", &url])
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    AcquireError::Unknown(
                        "yt-dlp not found. Please install it and ensure it's in your PATH."
                            .to_string(),
                    )
                } else {
                    AcquireError::Unknown(format!("Failed to run yt-dlp: {}", e))
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if stderr.contains("Video unavailable")
                || stderr.contains("This video is not available")
                || stderr.contains("does not exist")
            {
                return Err(AcquireError::NotFound(video_id.to_string()));
            }
            return Err(AcquireError::Unknown(format!(
                "yt-dlp failed for {}: {}",
                video_id,
                stderr.trim()
            )));
        }

        serde_json::from_str(&String::from_utf8_lossy(&output.stdout))
            .map_err(|e| AcquireError::Unknown(format!("Failed to parse yt-dlp output: {}", e)))
    }

    /// Pick a caption track URL from video metadata.
    ///
    /// Manual subtitles win over automatic captions; within a track list,
    /// English variants win over whatever comes first. Returns `None` when
    /// the selected track list exposes nothing usable.
    fn select_caption_track(metadata: &Value) -> Option<String> {
        for field in ["subtitles", "automatic_captions"] {
            let tracks = match metadata[field].as_object() {
                Some(obj) if !obj.is_empty() => obj,
                _ => continue,
            };

            let language = PREFERRED_LANGUAGES
                .iter()
                .find(|lang| tracks.contains_key(**lang))
                .map(|lang| lang.to_string())
                .or_else(|| tracks.keys().find(|k| k.starts_with("en")).cloned())
                .or_else(|| tracks.keys().next().cloned())?;

            let formats = tracks[&language].as_array()?;

            // Prefer a native json3 track; otherwise request one by
            // rewriting the format parameter.
            let track = formats
                .iter()
                .find(|f| f["ext"].as_str() == Some("json3"))
                .or_else(|| formats.first())?;

            let url = track["url"].as_str()?;
            debug!("Selected {} caption track ({})", language, field);

            return if track["ext"].as_str() == Some("json3") {
                Some(url.to_string())
            } else {
                Some(format!("{}&fmt=json3", url))
            };
        }
        None
    }

    /// True when the metadata lists no caption tracks of any kind.
    fn captions_absent(metadata: &Value) -> bool {
        ["subtitles", "automatic_captions"].iter().all(|field| {
            metadata[*field]
                .as_object()
                .map(|obj| obj.is_empty())
                .unwrap_or(true)
        })
    }

    /// Download and parse a json3 caption track into transcript segments.
    async fn fetch_track(&self, url: &str) -> std::result::Result<Vec<TranscriptSegment>, AcquireError> {
        let body: Value = self
            .http
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AcquireError::Unknown(format!("Caption track fetch failed: {}", e)))?
            .json()
            .await
            .map_err(|e| AcquireError::Unknown(format!("Caption track parse failed: {}", e)))?;

        let events = body["events"].as_array().cloned().unwrap_or_default();

        let segments = events
            .iter()
            .filter_map(|event| {
                let text: String = event["segs"]
                    .as_array()?
                    .iter()
                    .filter_map(|seg| seg["utf8"].as_str())
                    .collect();
                let text = text.trim();
                if text.is_empty() {
                    return None;
                }

                let start = event["tStartMs"].as_f64().map(|ms| ms / 1000.0);
                let duration = event["dDurationMs"].as_f64().map(|ms| ms / 1000.0);

                Some(TranscriptSegment {
                    text: text.to_string(),
                    start_seconds: start,
                    duration_seconds: duration,
                })
            })
            .collect();

        Ok(segments)
    }
}

impl Default for YoutubeTranscriptSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TranscriptSource for YoutubeTranscriptSource {
    #[instrument(skip(self), fields(video_id = %video_id))]
    async fn acquire(&self, video_id: &VideoId) -> std::result::Result<Transcript, AcquireError> {
        let metadata = self.fetch_metadata(video_id).await?;

        let track_url = match Self::select_caption_track(&metadata) {
            Some(url) => url,
            None if Self::captions_absent(&metadata) => {
                return Err(AcquireError::TranscriptsDisabled(video_id.to_string()))
            }
            None => return Err(AcquireError::NoTranscript(video_id.to_string())),
        };

        let segments = self.fetch_track(&track_url).await?;
        let transcript = Transcript::new(segments);

        if transcript.is_empty() {
            return Err(AcquireError::NoTranscript(video_id.to_string()));
        }

        debug!("Acquired {} transcript segments", transcript.segments.len());
        Ok(transcript)
    }

    #[instrument(skip(self), fields(channel = %channel))]
    async fn list_channel_videos(
        &self,
        channel: &ChannelId,
        limit: usize,
    ) -> Result<Vec<VideoListing>> {
        let output = tokio::process::Command::new("yt-dlp")
            .args([
                "--dump-json",
                "--no-download",
                "--no-warnings",
                "--flat-playlist",
                "--playlist-end",
                &limit.to_string(),
                &channel.videos_url(),
            ])
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    SvarError::ToolNotFound("yt-dlp".to_string())
                } else {
                    SvarError::Acquire(AcquireError::Unknown(format!(
                        "Failed to run yt-dlp: {}",
                        e
                    )))
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SvarError::Acquire(AcquireError::NotFound(format!(
                "channel {}: {}",
                channel,
                stderr.trim()
            ))));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let mut listings = Vec::new();

        for line in stdout.lines() {
            if line.trim().is_empty() {
                continue;
            }

            let json: Value = match serde_json::from_str(line) {
                Ok(v) => v,
                Err(e) => {
                    warn!("Skipping unparseable playlist entry: {}", e);
                    continue;
                }
            };

            let Some(raw_id) = json["id"].as_str() else {
                continue;
            };
            let Ok(video_id) = VideoId::from_id(raw_id) else {
                continue;
            };

            listings.push(VideoListing {
                video_id,
                title: json["title"].as_str().unwrap_or("Unknown Title").to_string(),
            });
        }

        Ok(listings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_select_prefers_manual_subtitles() {
        let metadata = json!({
            "subtitles": {
                "en": [{"ext": "json3", "url": "https://example.com/manual"}]
            },
            "automatic_captions": {
                "en": [{"ext": "json3", "url": "https://example.com/auto"}]
            }
        });
        assert_eq!(
            YoutubeTranscriptSource::select_caption_track(&metadata).as_deref(),
            Some("https://example.com/manual")
        );
    }

    #[test]
    fn test_select_prefers_english_language() {
        let metadata = json!({
            "subtitles": {},
            "automatic_captions": {
                "de": [{"ext": "json3", "url": "https://example.com/de"}],
                "en": [{"ext": "json3", "url": "https://example.com/en"}]
            }
        });
        assert_eq!(
            YoutubeTranscriptSource::select_caption_track(&metadata).as_deref(),
            Some("https://example.com/en")
        );
    }

    #[test]
    fn test_select_rewrites_non_json3_format() {
        let metadata = json!({
            "subtitles": {
                "en": [{"ext": "vtt", "url": "https://example.com/track?lang=en"}]
            }
        });
        assert_eq!(
            YoutubeTranscriptSource::select_caption_track(&metadata).as_deref(),
            Some("https://example.com/track?lang=en&fmt=json3")
        );
    }

    #[test]
    fn test_captions_absent() {
        let none = json!({"subtitles": {}, "automatic_captions": {}});
        assert!(YoutubeTranscriptSource::captions_absent(&none));

        let missing_fields = json!({"title": "whatever"});
        assert!(YoutubeTranscriptSource::captions_absent(&missing_fields));

        let some = json!({
            "subtitles": {},
            "automatic_captions": {"en": []}
        });
        assert!(!YoutubeTranscriptSource::captions_absent(&some));
    }
}
