//! Summarizer errors.

use thiserror::Error;

/// Failures of a Summarizer call, from credentials to answer parsing.
#[derive(Error, Debug)]
pub enum ClaudeError {
    /// No Anthropic API key in the environment or settings file.
    #[error("Anthropic API key not found; set ANTHROPIC_API_KEY or CLAUDE_API_KEY")]
    ApiKeyNotFound,

    /// The request did not produce an HTTP response.
    #[error("Messages API request did not complete")]
    Transport(#[source] reqwest::Error),

    /// HTTP 429 from the Messages API.
    #[error("Messages API rate limit reached")]
    RateLimited,

    /// Any other non-success status.
    #[error("Messages API returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly empty.
        body: String,
    },

    /// The response body is not a Messages API payload.
    #[error("Messages API response could not be decoded")]
    UndecodableResponse(#[source] reqwest::Error),

    /// The response carries no text block to read a change list from.
    #[error("Messages API response has no text block")]
    NoTextBlock,

    /// The answer is indented with tabs, which YAML rejects.
    #[error("Summary answer is indented with tabs; YAML needs spaces")]
    TabIndentedAnswer,

    /// The answer is not a `changes:` list of known categories.
    #[error("Summary answer is not a valid change list: {0}")]
    InvalidChangeList(String),
}
