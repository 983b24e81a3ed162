//! Preflight validation checks for early failure detection.
//!
//! Commands call these before starting network work so a missing
//! credential fails fast with a clear message instead of after the first
//! repository.

use anyhow::Result;

use crate::claude::client::API_KEY_VARS;
use crate::github::TOKEN_VARS;
use crate::utils::settings::get_env_vars;

/// Validates that an Anthropic API key is available.
///
/// Performs a lightweight lookup without building a client.
pub fn check_ai_credentials() -> Result<()> {
    get_env_vars(&API_KEY_VARS).map(|_| ()).map_err(|_| {
        anyhow::anyhow!(
            "Claude API key not found.\n\
             Set one of these environment variables:\n\
             - ANTHROPIC_API_KEY\n\
             - CLAUDE_API_KEY\n\
             or add it to the \"env\" map of ~/.commit-digest/settings.json"
        )
    })
}

/// Validates that a GitHub token is available for fetching diffs.
pub fn check_github_token() -> Result<()> {
    get_env_vars(&TOKEN_VARS).map(|_| ()).map_err(|_| {
        anyhow::anyhow!(
            "GitHub token not found.\n\
             Set one of these environment variables:\n\
             - GITHUB_TOKEN\n\
             - GITHUB_ACCESS_TOKEN\n\
             or pass pre-fetched diffs with --diffs"
        )
    })
}
