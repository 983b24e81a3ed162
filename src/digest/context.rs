//! Rendering of commits and diffs into Summarizer context.
//!
//! Without a budget every commit is rendered in full, in input order. With
//! a budget, accounting happens at two levels:
//!
//! - per file: a file block that would push the running total past the
//!   budget is replaced by [`OMITTED_DIFF_NOTICE`], counted at the notice's
//!   own size;
//! - per commit: a commit whose fully composed block would exceed the
//!   budget is left out and iteration stops, dropping every later commit
//!   from this blob.
//!
//! Files are visited smallest patch first under a budget so that as many
//! complete files as possible make it in.

use tracing::debug;

use super::token_budget::estimate_tokens;
use crate::config::DigestConfig;
use crate::data::{Commit, CommitDiffMap, FileChange};

/// Separator between rendered commit blocks.
pub const COMMIT_SEPARATOR: &str = "\n---\n";

/// Stands in for a file diff left out to respect the token budget.
pub const OMITTED_DIFF_NOTICE: &str = "[TRUNCATED: File diff omitted due to token budget constraints. This file was modified, but the full diff is not included. Analyze based on existing context.]\n";

fn render_header(commit: &Commit) -> String {
    format!(
        "Commit: {}\nAuthor: {}\nDate: {}\nMessage: {}\n",
        commit.short_sha(),
        commit.author,
        commit.timestamp_str(),
        commit.message
    )
}

fn render_file_line(file: &FileChange) -> String {
    format!("File: {} ({})\n", file.filename, file.status)
}

fn render_file(file: &FileChange) -> String {
    let mut block = render_file_line(file);
    if !file.patch.is_empty() {
        block.push_str(&format!("```\n{}\n```\n", file.patch));
    }
    block
}

fn render_omitted(file: &FileChange) -> String {
    let mut block = render_file_line(file);
    block.push_str(OMITTED_DIFF_NOTICE);
    block
}

/// Renders `commits` with their diffs into a single text blob.
///
/// Pure and deterministic: identical arguments give byte-identical output.
/// A budget of `Some(0)` is honoured and yields an empty string.
pub fn build_commit_context(
    commits: &[Commit],
    diffs: &CommitDiffMap,
    token_budget: Option<usize>,
    config: &DigestConfig,
) -> String {
    let estimate = |text: &str| estimate_tokens(text, config.chars_per_token);
    let mut parts = Vec::with_capacity(commits.len());
    let mut total_tokens = 0_usize;

    for (idx, commit) in commits.iter().enumerate() {
        let mut commit_text = render_header(commit);

        if let Some(files) = diffs.get(&commit.sha) {
            let mut ordered: Vec<&FileChange> = files.iter().collect();
            if token_budget.is_some() {
                ordered.sort_by_key(|file| file.patch_chars());
            }

            for file in ordered {
                let block = render_file(file);
                let block = match token_budget {
                    Some(budget) if total_tokens + estimate(&block) > budget => {
                        render_omitted(file)
                    }
                    _ => block,
                };
                commit_text.push_str(&block);
            }
        }

        let commit_tokens = estimate(&commit_text);
        if let Some(budget) = token_budget {
            if total_tokens + commit_tokens > budget {
                debug!(
                    included = idx,
                    dropped = commits.len() - idx,
                    budget,
                    "Token budget exhausted; dropping remaining commits"
                );
                break;
            }
        }

        parts.push(commit_text);
        total_tokens += commit_tokens;
    }

    parts.join(COMMIT_SEPARATOR)
}
