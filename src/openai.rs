//! OpenAI client configuration with sensible defaults.
//!
//! The API key is handed in explicitly; nothing here reads or writes the
//! process environment.

use crate::config::ApiKey;
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Default timeout for OpenAI API requests (2 minutes).
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Create an OpenAI client with configured timeout.
pub fn create_client(api_key: &ApiKey) -> Client<OpenAIConfig> {
    create_client_with_timeout(api_key, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
}

/// Create an OpenAI client with a custom timeout.
pub fn create_client_with_timeout(api_key: &ApiKey, timeout: Duration) -> Client<OpenAIConfig> {
    let http_client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .expect("Failed to create HTTP client");

    Client::with_config(OpenAIConfig::new().with_api_key(api_key.as_str()))
        .with_http_client(http_client)
}
