//! Configuration module for Svar.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{Prompts, RagPrompts, SummaryPrompts};
pub use settings::{
    ApiKey, ChannelSettings, ChunkingSettings, EmbeddingSettings, GeneralSettings, OpenAiSettings,
    PromptSettings, RetrievalSettings, Settings,
};
