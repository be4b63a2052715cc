//! Answer generation.

use super::context::format_context_for_prompt;
use super::FALLBACK_ANSWER;
use crate::config::{ApiKey, Prompts, RagPrompts};
use crate::error::{Result, SvarError};
use crate::index::ScoredChunk;
use crate::openai::create_client;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Trait for answer generation over retrieved chunks.
///
/// Callers guarantee `context` is non-empty; the session short-circuits
/// empty retrievals before reaching the answerer.
#[async_trait]
pub trait Answerer: Send + Sync {
    async fn answer(&self, question: &str, context: &[ScoredChunk]) -> Result<String>;
}

/// Answerer backed by the OpenAI chat completions API.
pub struct OpenAiAnswerer {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    temperature: f32,
    prompts: RagPrompts,
}

impl OpenAiAnswerer {
    pub fn new(api_key: &ApiKey, model: &str, temperature: f32) -> Self {
        Self {
            client: create_client(api_key),
            model: model.to_string(),
            temperature,
            prompts: RagPrompts::default(),
        }
    }

    /// Set custom prompts.
    pub fn with_prompts(mut self, prompts: RagPrompts) -> Self {
        self.prompts = prompts;
        self
    }
}

#[async_trait]
impl Answerer for OpenAiAnswerer {
    #[instrument(skip(self, context), fields(question = %question, chunks = context.len()))]
    async fn answer(&self, question: &str, context: &[ScoredChunk]) -> Result<String> {
        let mut vars = HashMap::new();
        vars.insert("question".to_string(), question.to_string());
        vars.insert("context".to_string(), format_context_for_prompt(context));

        let user_prompt = Prompts::render(&self.prompts.user, &vars);

        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(self.prompts.system.clone())
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
            .temperature(self.temperature)
            .build()
            .map_err(|e| SvarError::Answer(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| SvarError::Answer(format!("Chat API error: {}", e)))?;

        let answer = response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default();

        if answer.trim().is_empty() {
            debug!("Model returned an empty answer, using fallback");
            return Ok(FALLBACK_ANSWER.to_string());
        }

        Ok(answer)
    }
}
