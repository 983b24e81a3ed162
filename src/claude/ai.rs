//! Backend seam between the Summarizer and a model provider.

pub mod claude;

use std::future::Future;
use std::pin::Pin;

use anyhow::Result;

/// A model that answers one Summarizer prompt pair with raw text.
///
/// Implementations return the answer untouched; turning it into change
/// records is the Summarizer's job.
pub trait AiClient: Send + Sync {
    /// Model identifier the requests are sent to.
    fn model(&self) -> &str;

    /// Sends one system/user prompt pair and returns the text answer.
    fn send_request<'a>(
        &'a self,
        system_prompt: &'a str,
        user_prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>>;
}
