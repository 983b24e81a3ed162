//! GitHub REST client for commit diffs.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use super::{validate_repository, DiffSource, GitHubError, TOKEN_VARS};
use crate::config::DigestConfig;
use crate::data::FileChange;
use crate::utils::settings::get_env_vars;

/// HTTP request timeout for GitHub calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Media type requested from the API.
const ACCEPT: &str = "application/vnd.github+json";

/// The part of `GET /repos/{repo}/commits/{sha}` we read.
#[derive(Deserialize)]
struct CommitResponse {
    #[serde(default)]
    files: Vec<FileChange>,
}

/// Fetches commit diffs from the GitHub REST API.
///
/// Every request, successful or not, is followed by a pause of
/// `diff_fetch_delay_ms` to stay under the API rate limits.
pub struct GitHubClient {
    client: Client,
    token: String,
    api_base: Url,
    delay: Duration,
}

impl GitHubClient {
    /// Creates a client for the configured API base.
    pub fn new(token: String, config: &DigestConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("commit-digest/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            token,
            api_base: normalize_base(&config.github_api_base)?,
            delay: Duration::from_millis(config.diff_fetch_delay_ms),
        })
    }

    /// Creates a client with the token from the environment or settings file.
    pub fn from_env(config: &DigestConfig) -> Result<Self> {
        let token = get_env_vars(&TOKEN_VARS).map_err(|_| GitHubError::TokenNotFound)?;
        Self::new(token, config)
    }

    fn commit_url(&self, repository: &str, sha: &str) -> Result<Url, GitHubError> {
        self.api_base
            .join(&format!("repos/{repository}/commits/{sha}"))
            .map_err(|e| GitHubError::InvalidUrl(e.to_string()))
    }

    async fn request_commit(&self, url: Url) -> Result<Vec<FileChange>, GitHubError> {
        let response = self
            .client
            .get(url)
            .header("Authorization", format!("token {}", self.token))
            .header("Accept", ACCEPT)
            .send()
            .await
            .map_err(|e| GitHubError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GitHubError::RequestFailed {
                status: status.as_u16(),
                body,
            });
        }

        let commit: CommitResponse = response
            .json()
            .await
            .map_err(|e| GitHubError::InvalidResponse(e.to_string()))?;
        Ok(commit.files)
    }

    /// Fetches the files of one commit, pausing afterwards.
    pub async fn fetch_commit_files(&self, repository: &str, sha: &str) -> Result<Vec<FileChange>> {
        validate_repository(repository)?;
        let url = self.commit_url(repository, sha)?;
        debug!(url = %url, "Fetching commit diff");

        let result = self.request_commit(url).await;
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let files = result.with_context(|| format!("Failed to fetch diff for {repository}@{sha}"))?;
        debug!(sha, files = files.len(), "Fetched commit diff");
        Ok(files)
    }
}

impl DiffSource for GitHubClient {
    fn fetch_diffs<'a>(
        &'a self,
        repository: &'a str,
        sha: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<FileChange>>> + Send + 'a>> {
        Box::pin(self.fetch_commit_files(repository, sha))
    }
}

/// Parses the base URL and makes sure relative joins append to its path.
fn normalize_base(base: &str) -> Result<Url, GitHubError> {
    let with_slash = if base.ends_with('/') {
        base.to_string()
    } else {
        format!("{base}/")
    };
    Url::parse(&with_slash).map_err(|e| GitHubError::InvalidUrl(format!("{base}: {e}")))
}
