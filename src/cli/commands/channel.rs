//! Channel command implementation.

use super::question_loop;
use crate::cli::{preflight, Output};
use crate::config::Settings;
use crate::session::Session;
use anyhow::Result;

/// Run the channel command: load a channel's videos, then take questions.
pub async fn run_channel(channel_id: &str, limit: Option<usize>, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check_yt_dlp() {
        Output::error(&e.to_string());
        return Err(e.into());
    }

    let limit = limit.unwrap_or(settings.channel.max_videos);
    let mut session = Session::from_settings(&settings)?;

    let spinner = Output::spinner("Fetching channel transcripts and indexing...");
    match session.ingest_channel(channel_id, limit).await {
        Ok(report) => {
            spinner.finish_and_clear();
            Output::success(&format!(
                "Loaded {} videos ({} chunks)",
                report.videos_loaded, report.chunks_indexed
            ));
            if report.videos_failed > 0 {
                Output::warning(&format!(
                    "Skipped {} videos without usable transcripts",
                    report.videos_failed
                ));
                for failure in &report.failures {
                    Output::kv(failure.video_id.as_str(), &failure.error.to_string());
                }
            }
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&e.to_string());
            return Err(e.into());
        }
    }

    question_loop(&mut session).await
}
