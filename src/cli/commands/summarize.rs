//! Summarize command implementation.

use crate::chunking::SlidingWindowChunker;
use crate::cli::{preflight, Output};
use crate::config::{Prompts, Settings};
use crate::rag::Summarizer;
use crate::transcript::{TranscriptSource, YoutubeTranscriptSource};
use crate::video::VideoId;
use anyhow::Result;

/// Run the summarize command: fetch one transcript and produce a summary.
pub async fn run_summarize(url: &str, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check_yt_dlp() {
        Output::error(&e.to_string());
        return Err(e.into());
    }

    let video_id = VideoId::from_url(url)?;
    let api_key = settings.resolve_api_key()?;
    let prompts = Prompts::load(settings.prompts.custom_dir.as_deref())?;

    let chunker =
        SlidingWindowChunker::new(settings.chunking.chunk_size, settings.chunking.overlap)?;

    let spinner = Output::spinner("Fetching transcript...");
    let source = YoutubeTranscriptSource::new();
    let transcript = match source.acquire(&video_id).await {
        Ok(t) => {
            spinner.finish_and_clear();
            t
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&e.to_string());
            return Err(e.into());
        }
    };

    let chunks = chunker.split(&transcript.full_text());
    Output::info(&format!("Summarizing {} chunks...", chunks.len()));

    let summarizer =
        Summarizer::new(&api_key, &settings.openai.chat_model).with_prompts(prompts.summary);

    let spinner = Output::spinner("Generating summary...");
    match summarizer.summarize(&chunks).await {
        Ok(summary) => {
            spinner.finish_and_clear();
            Output::header("Summary");
            println!("\n{}\n", summary);
            Ok(())
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&e.to_string());
            Err(e.into())
        }
    }
}
