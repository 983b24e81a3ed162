//! GitHub-specific error handling.

use thiserror::Error;

/// GitHub REST API errors.
#[derive(Error, Debug)]
pub enum GitHubError {
    /// No token in the environment or settings file.
    #[error("GitHub token not found. Set GITHUB_TOKEN or GITHUB_ACCESS_TOKEN environment variable")]
    TokenNotFound,

    /// Repository identifier is not `owner/name`.
    #[error("Invalid repository identifier '{0}', expected owner/name")]
    InvalidRepository(String),

    /// API base URL could not be parsed or joined.
    #[error("Invalid GitHub API URL: {0}")]
    InvalidUrl(String),

    /// Non-success HTTP status.
    #[error("GitHub API request failed: HTTP {status}: {body}")]
    RequestFailed {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly empty.
        body: String,
    },

    /// Response body did not match the commit schema.
    #[error("Invalid response format from GitHub API: {0}")]
    InvalidResponse(String),

    /// Network connectivity error.
    #[error("Network error: {0}")]
    NetworkError(String),
}
