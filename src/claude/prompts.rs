//! Prompt templates for change summarization.

use crate::data::RepoContext;

/// Placeholder for a missing repository context field.
const NOT_AVAILABLE: &str = "N/A";

/// System prompt fixing the response format.
pub const SYSTEM_PROMPT: &str = r#"You are an experienced software engineer who reads Git history and reports what changed in a repository.

You will receive a list of commits, each with its metadata and the per-file diffs that belong to it. Some diffs may be truncated or omitted to fit the request; analyze what is visible.

Respond ONLY with valid YAML in exactly this format, with no prose before or after it:

```yaml
changes:
  - summary: "One or two sentences describing the change"
    category: feature
    contributing_commits:
      - "abc1234"
      - "def5678"
```

Rules:
- `category` must be one of: feature, improvement, fix, refactor, docs, test, chore
- `contributing_commits` lists the short commit hashes exactly as shown in the input
- Use `changes: []` when no change is worth reporting
- Use spaces for indentation, never tabs"#;

/// Renders the optional repository background section.
fn repo_context_section(repo_context: Option<&RepoContext>) -> String {
    let Some(ctx) = repo_context else {
        return String::new();
    };
    format!(
        "\nRepository Context:\n- Summary: {}\n- Stack: {}\n---\n",
        ctx.summary.as_deref().unwrap_or(NOT_AVAILABLE),
        ctx.stack.as_deref().unwrap_or(NOT_AVAILABLE),
    )
}

/// Builds the user prompt for one batch of commits.
pub fn generate_summary_user_prompt(
    repository: &str,
    context: &str,
    repo_context: Option<&RepoContext>,
) -> String {
    format!(
        "Analyze the following Git commits and code changes from repository {repository}.

{section}

Commits and Changes:
{context}

---

Your task:
1. Identify distinct changes/updates from these commits
2. Group related commits that contribute to the same logical change
3. Categorize each change as: feature, improvement, fix, refactor, docs, test, or chore
4. Write a clear, concise summary for each change (1-2 sentences)

Guidelines:
- Focus on WHAT changed
- Combine small related commits into single logical changes
- Skip trivial changes (typo fixes, formatting) unless they're part of a larger change
- Include the commit SHAs that contributed to each change",
        section = repo_context_section(repo_context),
    )
}
