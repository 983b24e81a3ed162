//! Summarizer output and per-repository results.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Category of a summarized change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeCategory {
    /// New user-facing capability.
    Feature,
    /// Enhancement of existing behaviour.
    Improvement,
    /// Bug fix.
    Fix,
    /// Restructuring without behaviour change.
    Refactor,
    /// Documentation.
    Docs,
    /// Tests.
    Test,
    /// Maintenance.
    Chore,
}

impl ChangeCategory {
    /// All categories, in prompt order.
    pub const ALL: [Self; 7] = [
        Self::Feature,
        Self::Improvement,
        Self::Fix,
        Self::Refactor,
        Self::Docs,
        Self::Test,
        Self::Chore,
    ];

    /// Lower-case wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Feature => "feature",
            Self::Improvement => "improvement",
            Self::Fix => "fix",
            Self::Refactor => "refactor",
            Self::Docs => "docs",
            Self::Test => "test",
            Self::Chore => "chore",
        }
    }
}

impl fmt::Display for ChangeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One logical change extracted by the Summarizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRecord {
    /// One or two sentence description.
    pub summary: String,
    /// Change category.
    pub category: ChangeCategory,
    /// Hashes of the commits behind this change. Not verified against the batch.
    #[serde(default)]
    pub contributing_commits: Vec<String>,
}

/// Optional background about a repository, fed into the prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoContext {
    /// What the repository is for.
    #[serde(default)]
    pub summary: Option<String>,
    /// Technology stack.
    #[serde(default)]
    pub stack: Option<String>,
}

/// Final result for one repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryAnalysis {
    /// Repository identifier (`owner/name`).
    pub repository: String,
    /// Accumulated change records, in Summarizer invocation order.
    pub changes: Vec<ChangeRecord>,
}

impl RepositoryAnalysis {
    /// A result with no changes.
    pub fn empty(repository: impl Into<String>) -> Self {
        Self {
            repository: repository.into(),
            changes: Vec::new(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn category_names_are_lowercase() {
        for category in ChangeCategory::ALL {
            let json = serde_json::to_string(&category).unwrap();
            assert_eq!(json, format!("\"{}\"", category.as_str()));
        }
    }

    #[test]
    fn unknown_category_rejected() {
        let result: Result<ChangeRecord, _> = serde_json::from_str(
            r#"{"summary": "x", "category": "perf", "contributing_commits": []}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn change_record_from_json() {
        let record: ChangeRecord = serde_json::from_str(
            r#"{"summary": "Added login", "category": "feature",
                "contributing_commits": ["abc123", "def456"]}"#,
        )
        .unwrap();
        assert_eq!(record.category, ChangeCategory::Feature);
        assert_eq!(record.contributing_commits.len(), 2);
    }
}
