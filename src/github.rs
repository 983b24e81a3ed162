//! Commit diff sources: the GitHub REST API or a pre-fetched JSON file.

pub mod client;
pub mod error;

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::future::Future;
use std::path::Path;
use std::pin::Pin;

use anyhow::{Context, Result};

use crate::data::FileChange;

pub use client::GitHubClient;
pub use error::GitHubError;

/// Environment variables holding the GitHub token, in lookup order.
pub const TOKEN_VARS: [&str; 2] = ["GITHUB_TOKEN", "GITHUB_ACCESS_TOKEN"];

/// Source of per-commit file changes.
pub trait DiffSource: Send + Sync {
    /// Returns the raw file changes of one commit.
    fn fetch_diffs<'a>(
        &'a self,
        repository: &'a str,
        sha: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<FileChange>>> + Send + 'a>>;
}

/// Checks that a repository identifier has the `owner/name` shape.
pub fn validate_repository(repository: &str) -> Result<(), GitHubError> {
    let valid = repository.split_once('/').is_some_and(|(owner, name)| {
        !owner.is_empty()
            && !name.is_empty()
            && !name.contains('/')
            && !repository.chars().any(char::is_whitespace)
    });

    if valid {
        Ok(())
    } else {
        Err(GitHubError::InvalidRepository(repository.to_string()))
    }
}

/// Diff source backed by a pre-fetched `{repository: {sha: [files]}}` map.
///
/// Unknown repositories and commits yield no files.
#[derive(Debug, Default)]
pub struct StaticDiffSource {
    repositories: HashMap<String, BTreeMap<String, Vec<FileChange>>>,
}

impl StaticDiffSource {
    /// Parses the JSON map.
    pub fn from_json(json: &str) -> Result<Self> {
        let repositories = serde_json::from_str(json).context("Failed to parse diffs JSON")?;
        Ok(Self { repositories })
    }

    /// Loads the JSON map from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read diffs file: {}", path.display()))?;
        Self::from_json(&content)
            .with_context(|| format!("Invalid diffs file: {}", path.display()))
    }

    /// Registers the files of one commit.
    pub fn insert(&mut self, repository: &str, sha: &str, files: Vec<FileChange>) {
        self.repositories
            .entry(repository.to_string())
            .or_default()
            .insert(sha.to_string(), files);
    }
}

impl DiffSource for StaticDiffSource {
    fn fetch_diffs<'a>(
        &'a self,
        repository: &'a str,
        sha: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<FileChange>>> + Send + 'a>> {
        let files = self
            .repositories
            .get(repository)
            .and_then(|commits| commits.get(sha))
            .cloned()
            .unwrap_or_default();
        Box::pin(async move { Ok(files) })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::data::FileStatus;

    #[test]
    fn repository_shape() {
        assert!(validate_repository("acme/api").is_ok());
        assert!(validate_repository("acme-corp/api.rs").is_ok());

        for bad in ["", "acme", "/api", "acme/", "acme/api/extra", "acme/my api"] {
            assert!(
                matches!(validate_repository(bad), Err(GitHubError::InvalidRepository(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn static_source_serves_known_commits() {
        let source = StaticDiffSource::from_json(
            r#"{"acme/api": {"abc123": [
                {"filename": "src/lib.rs", "status": "added", "additions": 3,
                 "deletions": 0, "patch": "@@ +1,3 @@"}
            ]}}"#,
        )
        .unwrap();

        let files = source.fetch_diffs("acme/api", "abc123").await.unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].status, FileStatus::Added);

        assert!(source.fetch_diffs("acme/api", "missing").await.unwrap().is_empty());
        assert!(source.fetch_diffs("other/repo", "abc123").await.unwrap().is_empty());
    }

    #[test]
    fn static_source_rejects_malformed_json() {
        assert!(StaticDiffSource::from_json(r#"{"acme/api": []}"#).is_err());
    }
}
