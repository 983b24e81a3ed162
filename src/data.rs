//! Data model and JSON input/output.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::warn;

pub mod analysis;
pub mod commit;

pub use analysis::*;
pub use commit::*;

/// Repositories in input order, each with its fetched activity.
pub type ActivityData = Vec<(String, ActivityEntry)>;

/// Parses activity JSON (`{"owner/repo": {"commits": [...]}, ...}`),
/// keeping the repositories in the order they appear in the document.
///
/// Only a document that is not an object fails as a whole. An entry that
/// does not decode is kept as [`ActivityEntry::Malformed`].
pub fn parse_activity(json: &str) -> Result<ActivityData> {
    let value: serde_json::Value =
        serde_json::from_str(json).context("Failed to parse activity JSON")?;
    let serde_json::Value::Object(map) = value else {
        bail!("Activity JSON must be an object keyed by repository");
    };

    Ok(map
        .into_iter()
        .map(|(repository, value)| {
            let entry = match serde_json::from_value::<RepositoryActivity>(value) {
                Ok(activity) => ActivityEntry::Parsed(activity),
                Err(e) => {
                    warn!(repository = %repository, "Invalid activity entry: {e}");
                    ActivityEntry::Malformed(e.to_string())
                }
            };
            (repository, entry)
        })
        .collect())
}

/// Loads activity JSON from a file.
pub fn load_activity<P: AsRef<Path>>(path: P) -> Result<ActivityData> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read activity file: {}", path.display()))?;
    parse_activity(&content)
}

/// Loads per-repository context (`{"owner/repo": {"summary": .., "stack": ..}}`).
pub fn load_repo_contexts<P: AsRef<Path>>(path: P) -> Result<HashMap<String, RepoContext>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read repository context file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse repository context file: {}", path.display()))
}

/// Writes analyses as pretty-printed JSON.
pub fn save_analyses<P: AsRef<Path>>(path: P, analyses: &[RepositoryAnalysis]) -> Result<()> {
    let path = path.as_ref();
    let json =
        serde_json::to_string_pretty(analyses).context("Failed to serialize analyses to JSON")?;
    fs::write(path, json)
        .with_context(|| format!("Failed to write analyses file: {}", path.display()))
}
