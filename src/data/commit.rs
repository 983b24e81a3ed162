//! Commit and file change records.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of characters shown for an abbreviated commit hash.
pub const SHORT_SHA_LEN: usize = 7;

/// A commit as fetched from the hosting service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "CommitRecord")]
pub struct Commit {
    /// Full commit hash.
    pub sha: String,
    /// Commit message.
    pub message: String,
    /// Author login or name.
    pub author: String,
    /// ISO-8601 author date, as received.
    pub timestamp: Option<String>,
    /// Web URL of the commit.
    pub url: String,
}

/// Wire form of [`Commit`]; any field may be missing or `null`.
#[derive(Deserialize)]
struct CommitRecord {
    #[serde(default)]
    sha: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    timestamp: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

impl From<CommitRecord> for Commit {
    fn from(record: CommitRecord) -> Self {
        Self {
            sha: record.sha.unwrap_or_default(),
            message: record.message.unwrap_or_default(),
            author: record.author.unwrap_or_else(|| "Unknown".to_string()),
            timestamp: record.timestamp,
            url: record.url.unwrap_or_default(),
        }
    }
}

impl Commit {
    /// Returns the abbreviated hash used in rendered context.
    pub fn short_sha(&self) -> &str {
        match self.sha.char_indices().nth(SHORT_SHA_LEN) {
            Some((idx, _)) => &self.sha[..idx],
            None => &self.sha,
        }
    }

    /// Returns the raw timestamp, or an empty string when absent.
    pub fn timestamp_str(&self) -> &str {
        self.timestamp.as_deref().unwrap_or("")
    }
}

/// Change status of a file within a commit.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FileStatus {
    /// File was created.
    Added,
    /// File contents changed.
    #[default]
    Modified,
    /// File was deleted.
    Removed,
    /// File was moved.
    Renamed,
    /// Any other status reported by the hosting service.
    Other(String),
}

impl FileStatus {
    /// Returns the status as it appears on the wire.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Added => "added",
            Self::Modified => "modified",
            Self::Removed => "removed",
            Self::Renamed => "renamed",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for FileStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "added" => Self::Added,
            "modified" => Self::Modified,
            "removed" => Self::Removed,
            "renamed" => Self::Renamed,
            _ => Self::Other(value),
        }
    }
}

impl From<FileStatus> for String {
    fn from(value: FileStatus) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One file touched by a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChange {
    /// Repository-relative path.
    #[serde(default)]
    pub filename: String,
    /// Change status.
    #[serde(default)]
    pub status: FileStatus,
    /// Lines added.
    #[serde(default)]
    pub additions: u64,
    /// Lines removed.
    #[serde(default)]
    pub deletions: u64,
    /// Unified diff text; empty for binary files or when unavailable.
    #[serde(default)]
    pub patch: String,
}

impl FileChange {
    /// Patch length in characters, used to order files under a budget.
    pub fn patch_chars(&self) -> usize {
        self.patch.chars().count()
    }
}

/// Normalized diffs keyed by commit hash.
///
/// Built once per repository before any sizing decision and only read
/// afterwards. Commits with no retained files have no entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommitDiffMap {
    entries: BTreeMap<String, Vec<FileChange>>,
}

impl CommitDiffMap {
    /// Returns the files recorded for `sha`.
    pub fn get(&self, sha: &str) -> Option<&[FileChange]> {
        self.entries.get(sha).map(Vec::as_slice)
    }

    /// Number of commits with diffs.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no commit has diffs.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, Vec<FileChange>)> for CommitDiffMap {
    fn from_iter<I: IntoIterator<Item = (String, Vec<FileChange>)>>(iter: I) -> Self {
        let entries = iter
            .into_iter()
            .filter(|(sha, files)| !sha.is_empty() && !files.is_empty())
            .collect();
        Self { entries }
    }
}

/// Activity fetched for one repository.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RepositoryActivity {
    /// Commits in the order they were fetched.
    #[serde(default)]
    pub commits: Vec<Commit>,
}

/// One repository's entry in the activity input.
///
/// Entries are decoded one by one; a malformed entry keeps its decode
/// error so that only its own repository fails.
#[derive(Debug, Clone)]
pub enum ActivityEntry {
    /// Decoded activity.
    Parsed(RepositoryActivity),
    /// The entry could not be decoded.
    Malformed(String),
}

impl ActivityEntry {
    /// Returns the decoded activity or the decode error.
    pub fn activity(&self) -> anyhow::Result<&RepositoryActivity> {
        match self {
            Self::Parsed(activity) => Ok(activity),
            Self::Malformed(reason) => anyhow::bail!("Invalid activity entry: {reason}"),
        }
    }
}

impl From<RepositoryActivity> for ActivityEntry {
    fn from(activity: RepositoryActivity) -> Self {
        Self::Parsed(activity)
    }
}
