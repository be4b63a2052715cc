//! Map-reduce video summarization.
//!
//! Each chunk is summarized on its own, then the partial summaries are
//! combined in a single reduce call. A single chunk skips the reduce step.

use crate::chunking::Chunk;
use crate::config::{ApiKey, Prompts, SummaryPrompts};
use crate::error::{Result, SvarError};
use crate::openai::create_client;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use std::collections::HashMap;
use tracing::{debug, instrument};

pub struct Summarizer {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    prompts: SummaryPrompts,
}

impl Summarizer {
    pub fn new(api_key: &ApiKey, model: &str) -> Self {
        Self {
            client: create_client(api_key),
            model: model.to_string(),
            prompts: SummaryPrompts::default(),
        }
    }

    /// Set custom prompts.
    pub fn with_prompts(mut self, prompts: SummaryPrompts) -> Self {
        self.prompts = prompts;
        self
    }

    /// Summarize a chunked transcript.
    #[instrument(skip(self, chunks), fields(chunks = chunks.len()))]
    pub async fn summarize(&self, chunks: &[Chunk]) -> Result<String> {
        if chunks.is_empty() {
            return Err(SvarError::InvalidInput(
                "Nothing to summarize: the transcript produced no chunks".to_string(),
            ));
        }

        // Map: one partial summary per chunk, in order.
        let mut partials = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            let partial = self
                .complete(
                    &self.prompts.map_system,
                    &self.prompts.map_user,
                    &chunk.content,
                )
                .await?;
            debug!("Summarized chunk {}", chunk.order);
            partials.push(partial);
        }

        if partials.len() == 1 {
            return Ok(partials.remove(0));
        }

        // Reduce: combine partial summaries.
        self.complete(
            &self.prompts.reduce_system,
            &self.prompts.reduce_user,
            &partials.join("\n\n"),
        )
        .await
    }

    async fn complete(&self, system: &str, user_template: &str, text: &str) -> Result<String> {
        let mut vars = HashMap::new();
        vars.insert("text".to_string(), text.to_string());
        let user_prompt = Prompts::render(user_template, &vars);

        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system.to_string())
                .build()
                .map_err(|e| SvarError::Answer(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(user_prompt)
                .build()
                .map_err(|e| SvarError::Answer(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(0.0)
            .build()
            .map_err(|e| SvarError::Answer(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| SvarError::Answer(format!("Chat API error: {}", e)))?;

        response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| SvarError::Answer("Empty response from model".to_string()))
    }
}
