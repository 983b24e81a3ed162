//! Claude API client implementation.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use super::AiClient;
use crate::claude::error::ClaudeError;

/// Default Anthropic API endpoint.
pub const DEFAULT_API_BASE: &str = "https://api.anthropic.com";

/// Anthropic API version header value.
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Upper bound for one Messages API call, including generation.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Claude API request message.
#[derive(Serialize)]
struct Message {
    role: String,
    content: String,
}

/// Claude API request body.
#[derive(Serialize)]
struct ClaudeRequest {
    model: String,
    max_tokens: u32,
    temperature: f32,
    system: String,
    messages: Vec<Message>,
}

/// Claude API response content.
#[derive(Deserialize)]
struct Content {
    #[serde(rename = "type")]
    content_type: String,
    #[serde(default)]
    text: String,
}

/// Claude API response.
#[derive(Deserialize)]
struct ClaudeResponse {
    content: Vec<Content>,
}

/// Claude API client implementation.
pub struct ClaudeAiClient {
    /// HTTP client for API requests.
    client: Client,
    /// API key for authentication.
    api_key: String,
    /// Model identifier.
    model: String,
    /// Response token cap per request.
    max_tokens: u32,
    /// Sampling temperature.
    temperature: f32,
    /// Base URL, without the `/v1/messages` suffix.
    api_base: String,
}

impl ClaudeAiClient {
    /// Creates a new Claude AI client.
    pub fn new(model: String, api_key: String, max_tokens: u32, temperature: f32) -> Result<Self> {
        Ok(Self {
            client: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .context("Failed to build HTTP client")?,
            api_key,
            model,
            max_tokens,
            temperature,
            api_base: DEFAULT_API_BASE.to_string(),
        })
    }

    /// Points the client at a different API host.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.api_base)
    }
}

/// Maps a non-success Messages API response to a typed error.
async fn status_error(response: reqwest::Response) -> ClaudeError {
    let status = response.status();
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return ClaudeError::RateLimited;
    }
    let body = response.text().await.unwrap_or_else(|e| {
        debug!("Failed to read error response body: {e}");
        String::new()
    });
    ClaudeError::Status {
        status: status.as_u16(),
        body,
    }
}

impl AiClient for ClaudeAiClient {
    fn model(&self) -> &str {
        &self.model
    }

    fn send_request<'a>(
        &'a self,
        system_prompt: &'a str,
        user_prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>> {
        Box::pin(async move {
            debug!(
                system_prompt_len = system_prompt.len(),
                user_prompt_len = user_prompt.len(),
                model = %self.model,
                "Preparing Claude API request"
            );

            let request = ClaudeRequest {
                model: self.model.clone(),
                max_tokens: self.max_tokens,
                temperature: self.temperature,
                system: system_prompt.to_string(),
                messages: vec![Message {
                    role: "user".to_string(),
                    content: user_prompt.to_string(),
                }],
            };

            let url = self.messages_url();
            info!(
                url = %url,
                model = %self.model,
                max_tokens = self.max_tokens,
                "Sending request to Claude API"
            );

            let response = self
                .client
                .post(&url)
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .header("content-type", "application/json")
                .json(&request)
                .send()
                .await
                .map_err(ClaudeError::Transport)?;

            if !response.status().is_success() {
                return Err(anyhow::Error::from(status_error(response).await));
            }

            let claude_response: ClaudeResponse = response
                .json()
                .await
                .map_err(ClaudeError::UndecodableResponse)?;

            debug!(
                content_count = claude_response.content.len(),
                "Received Claude API response"
            );

            let text = claude_response
                .content
                .into_iter()
                .find(|c| c.content_type == "text")
                .map(|c| c.text)
                .ok_or(ClaudeError::NoTextBlock)?;

            debug!(answer_len = text.len(), "Extracted answer text");
            trace!(answer = %text, "Claude answer");
            Ok::<_, anyhow::Error>(text)
        })
    }
}
