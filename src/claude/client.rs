//! Summarizer client: turns a commit context into change records.

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, info};

use crate::claude::ai::claude::ClaudeAiClient;
use crate::claude::ai::AiClient;
use crate::claude::{error::ClaudeError, prompts};
use crate::config::DigestConfig;
use crate::data::{ChangeRecord, RepoContext};
use crate::utils::settings::{get_env_var, get_env_vars};

/// Environment variables holding the Anthropic API key, in lookup order.
pub const API_KEY_VARS: [&str; 2] = ["ANTHROPIC_API_KEY", "CLAUDE_API_KEY"];

/// Environment variable overriding the configured model.
pub const MODEL_VAR: &str = "CLAUDE_MODEL";

/// Shape of the model's YAML answer.
#[derive(Debug, Deserialize)]
struct ChangesResponse {
    #[serde(default)]
    changes: Option<Vec<ChangeRecord>>,
}

/// Claude client for change summarization.
pub struct ClaudeClient {
    /// AI client implementation.
    ai_client: Box<dyn AiClient>,
}

impl ClaudeClient {
    /// Creates a new Claude client with the provided AI client implementation.
    pub fn new(ai_client: Box<dyn AiClient>) -> Self {
        Self { ai_client }
    }

    /// Model the summaries are requested from.
    pub fn model(&self) -> &str {
        self.ai_client.model()
    }

    /// Sends a raw prompt pair to the AI client.
    pub async fn send_message(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        self.ai_client
            .send_request(system_prompt, user_prompt)
            .await
    }

    /// Summarizes one batch of commits into change records.
    ///
    /// An answer with no `changes` yields an empty list; transport and
    /// parse failures are returned as errors for the caller to contain.
    pub async fn summarize_changes(
        &self,
        repository: &str,
        context: &str,
        repo_context: Option<&RepoContext>,
    ) -> Result<Vec<ChangeRecord>> {
        let user_prompt = prompts::generate_summary_user_prompt(repository, context, repo_context);

        debug!(
            repository,
            context_len = context.len(),
            prompt_len = user_prompt.len(),
            "Requesting change summary"
        );

        let content = self
            .send_message(prompts::SYSTEM_PROMPT, &user_prompt)
            .await
            .with_context(|| format!("Summarizer request failed for {repository}"))?;

        let changes = parse_changes_response(&content)?;
        debug!(repository, changes = changes.len(), "Parsed change summary");
        Ok(changes)
    }
}

/// Extracts the YAML body from a possibly fenced answer.
fn extract_yaml(content: &str) -> &str {
    let fenced = if content.contains("```yaml") {
        content.split("```yaml").nth(1)
    } else if content.contains("```") {
        content.split("```").nth(1)
    } else {
        None
    };

    fenced
        .and_then(|s| s.split("```").next())
        .unwrap_or(content)
        .trim()
}

/// Parses the model's YAML answer into change records.
pub(crate) fn parse_changes_response(content: &str) -> Result<Vec<ChangeRecord>> {
    let yaml_content = extract_yaml(content);
    if yaml_content.is_empty() {
        return Ok(Vec::new());
    }

    let response: ChangesResponse = serde_yaml::from_str(yaml_content).map_err(|e| {
        debug!(raw_response = %content, "Unparseable Summarizer response");
        if yaml_content.lines().any(|line| line.contains('\t')) {
            ClaudeError::TabIndentedAnswer
        } else {
            ClaudeError::InvalidChangeList(e.to_string())
        }
    })?;

    Ok(response.changes.unwrap_or_default())
}

/// Resolves the Anthropic API key from the environment or settings file.
fn resolve_api_key() -> Result<String> {
    get_env_vars(&API_KEY_VARS).map_err(|_| ClaudeError::ApiKeyNotFound.into())
}

/// Resolves the model: explicit override, then `CLAUDE_MODEL`, then config.
pub fn resolve_model(model_override: Option<String>, config: &DigestConfig) -> String {
    model_override
        .or_else(|| get_env_var(MODEL_VAR).ok())
        .unwrap_or_else(|| config.model.clone())
}

/// Creates a Claude client backed by the Anthropic API.
pub fn create_default_claude_client(
    config: &DigestConfig,
    model_override: Option<String>,
) -> Result<ClaudeClient> {
    let api_key = resolve_api_key()?;
    let model = resolve_model(model_override, config);

    info!(model = %model, "Using Anthropic API");

    let ai_client = ClaudeAiClient::new(model, api_key, config.max_tokens, config.temperature)?;
    Ok(ClaudeClient::new(Box::new(ai_client)))
}
