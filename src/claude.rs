//! Claude API integration for change summarization.

pub mod ai;
pub mod client;
pub mod error;
pub mod prompts;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod test_utils;

pub use ai::claude::ClaudeAiClient;
pub use ai::AiClient;
pub use client::{create_default_claude_client, ClaudeClient};
pub use error::ClaudeError;
