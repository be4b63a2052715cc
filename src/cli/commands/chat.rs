//! Chat command implementation.

use super::question_loop;
use crate::cli::{preflight, Output};
use crate::config::Settings;
use crate::session::Session;
use anyhow::Result;

/// Run the chat command: load one video, then take questions.
pub async fn run_chat(url: &str, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check_yt_dlp() {
        Output::error(&e.to_string());
        return Err(e.into());
    }

    let mut session = Session::from_settings(&settings)?;

    let spinner = Output::spinner("Fetching transcript and indexing...");
    match session.ingest(url).await {
        Ok(report) => {
            spinner.finish_and_clear();
            Output::success(&format!(
                "Loaded {} ({} chunks)",
                report.video_ref, report.chunks_indexed
            ));
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&e.to_string());
            return Err(e.into());
        }
    }

    question_loop(&mut session).await
}
