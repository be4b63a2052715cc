//! CLI module for Svar.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Svar - Ask questions about YouTube videos
///
/// Fetches video transcripts, indexes them for semantic search, and answers
/// questions with an LLM over the retrieved passages.
/// The name "Svar" comes from the Norwegian word for "answer."
#[derive(Parser, Debug)]
#[command(name = "svar")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load a video and chat about it interactively
    Chat {
        /// YouTube video URL
        url: String,
    },

    /// Load a channel's videos and chat about them interactively
    Channel {
        /// Channel id (24 characters, starting with "UC")
        channel_id: String,

        /// Maximum number of videos to load
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Ask a single question about a video
    Ask {
        /// YouTube video URL
        url: String,

        /// The question to ask
        question: String,

        /// Number of transcript chunks to retrieve
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
    },

    /// Summarize a video
    Summarize {
        /// YouTube video URL
        url: String,
    },

    /// Start an HTTP API server over a single shared session
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(long, default_value = "7717")]
        port: u16,
    },

    /// Show or locate the configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Print the configuration file path
    Path,
}
