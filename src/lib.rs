//! Svar - YouTube Q&A with RAG
//!
//! A CLI tool for asking natural-language questions about YouTube videos.
//!
//! The name "Svar" comes from the Norwegian word for "answer."
//!
//! # Overview
//!
//! Svar allows you to:
//! - Load a YouTube video (or a whole channel) by fetching its transcript
//! - Index the transcript for semantic search, in memory
//! - Ask questions and get AI-generated answers grounded in the transcript
//! - Summarize a video in one shot
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management
//! - `video` - Video/channel reference parsing and validation
//! - `transcript` - Transcript acquisition (YouTube captions)
//! - `chunking` - Sliding-window transcript chunking
//! - `embedding` - Embedding generation
//! - `index` - In-memory similarity index
//! - `rag` - Answer generation and summarization
//! - `session` - The stateful Q&A session tying it all together
//!
//! # Example
//!
//! ```rust,no_run
//! use svar::config::Settings;
//! use svar::session::Session;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let mut session = Session::from_settings(&settings)?;
//!
//!     let report = session
//!         .ingest("https://www.youtube.com/watch?v=dQw4w9WgXcQ")
//!         .await?;
//!     println!("Indexed {} chunks", report.chunks_indexed);
//!
//!     let response = session.ask("What is the video about?").await?;
//!     println!("{}", response.answer);
//!
//!     Ok(())
//! }
//! ```

pub mod chunking;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod index;
pub mod openai;
pub mod rag;
pub mod session;
pub mod transcript;
pub mod video;

pub use error::{Result, SvarError};
