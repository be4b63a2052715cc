//! Ask command implementation.

use super::print_response;
use crate::cli::{preflight, Output};
use crate::config::Settings;
use crate::session::Session;
use anyhow::Result;

/// Run the ask command: load one video and answer a single question.
pub async fn run_ask(
    url: &str,
    question: &str,
    top_k: Option<usize>,
    settings: Settings,
) -> Result<()> {
    if let Err(e) = preflight::check_yt_dlp() {
        Output::error(&e.to_string());
        return Err(e.into());
    }

    let mut session = Session::from_settings(&settings)?;
    if let Some(k) = top_k {
        session = session.with_top_k(k);
    }

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

    let spinner = Output::spinner("Thinking...");
    match session.ask(question).await {
        Ok(response) => {
            spinner.finish_and_clear();
            print_response(&response);
            Ok(())
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&e.to_string());
            Err(e.into())
        }
    }
}
