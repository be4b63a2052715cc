//! CLI command implementations.

mod ask;
mod channel;
mod chat;
mod config;
mod serve;
mod summarize;

pub use ask::run_ask;
pub use channel::run_channel;
pub use chat::run_chat;
pub use config::run_config;
pub use serve::run_serve;
pub use summarize::run_summarize;

use crate::cli::Output;
use crate::session::{AskResponse, Session};
use console::style;
use std::io::{self, BufRead, Write};

/// Print an answer and the chunks it drew on.
fn print_response(response: &AskResponse) {
    println!("\n{}\n", response.answer);

    if !response.sources.is_empty() {
        Output::header("Sources");
        for (i, source) in response.sources.iter().enumerate() {
            Output::source(i + 1, source.score, &source.chunk.content);
        }
        println!();
    }
}

/// Interactive question loop shared by `chat` and `channel`.
///
/// Recognizes `exit`/`quit`, `forget`, and `load <url>` to switch videos
/// without restarting.
async fn question_loop(session: &mut Session) -> anyhow::Result<()> {
    println!(
        "\n{}",
        style("Ask away! (type 'exit' to quit, 'load <url>' to switch videos)").dim()
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("\n{} ", style("You:").green().bold());
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            Output::info("Goodbye!");
            break;
        }

        if input.eq_ignore_ascii_case("forget") {
            session.forget();
            Output::info("Forgot the loaded video.");
            continue;
        }

        if let Some(url) = input.strip_prefix("load ") {
            let spinner = Output::spinner("Fetching transcript and indexing...");
            match session.ingest(url.trim()).await {
                Ok(report) => {
                    spinner.finish_and_clear();
                    Output::success(&format!(
                        "Loaded {} ({} chunks)",
                        report.video_ref, report.chunks_indexed
                    ));
                }
                Err(e) => {
                    spinner.finish_and_clear();
                    // The previous corpus, if any, is still loaded.
                    Output::error(&e.to_string());
                }
            }
            continue;
        }

        let spinner = Output::spinner("Thinking...");
        match session.ask(input).await {
            Ok(response) => {
                spinner.finish_and_clear();
                print_response(&response);
            }
            Err(e) => {
                spinner.finish_and_clear();
                Output::error(&e.to_string());
            }
        }
    }

    Ok(())
}
