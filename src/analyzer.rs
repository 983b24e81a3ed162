//! Per-repository pipeline: fetch diffs, plan batches, summarize.
//!
//! Failures are contained at two levels. A failed diff fetch or Summarizer
//! call degrades to "no diffs" or "no records" for that commit or batch;
//! any other error aborts only the repository it occurred in, which then
//! reports an empty analysis.

use std::collections::HashMap;

use anyhow::Result;
use tracing::{debug, error, info, warn};

use crate::claude::ClaudeClient;
use crate::config::DigestConfig;
use crate::data::{
    ActivityData, ActivityEntry, ChangeRecord, Commit, CommitDiffMap, RepoContext,
    RepositoryAnalysis,
};
use crate::digest::{build_commit_context, normalize_files, plan_repository, DigestPlan, Tier};
use crate::github::{validate_repository, DiffSource};

/// Normalized diffs of one repository plus the commits whose fetch failed.
#[derive(Debug, Default)]
pub struct DiffCollection {
    /// Normalized file changes by sha.
    pub diffs: CommitDiffMap,
    /// Shas whose diff could not be fetched.
    pub failed: Vec<String>,
}

/// What became of one Summarizer call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    /// The call returned this many records.
    Summarized(usize),
    /// The call succeeded with no records.
    Empty,
    /// The call failed; the batch contributes nothing.
    Failed(String),
}

/// Outcome of one planned batch.
#[derive(Debug, Clone)]
pub struct BatchReport {
    /// Label of the planned batch.
    pub label: String,
    /// Commits in the batch.
    pub commits: usize,
    /// Budget the context was rendered with.
    pub token_budget: Option<usize>,
    /// Result of the Summarizer call.
    pub outcome: BatchOutcome,
}

/// Execution details of one repository.
#[derive(Debug, Clone)]
pub struct DigestReport {
    /// Tier the repository was processed with.
    pub tier: Tier,
    /// Estimated tokens of the whole repository.
    pub total_tokens: usize,
    /// Batches in execution order.
    pub batches: Vec<BatchReport>,
    /// Shas whose diffs could not be fetched.
    pub failed_diffs: Vec<String>,
}

impl DigestReport {
    /// Number of batches whose Summarizer call failed.
    pub fn failed_batches(&self) -> usize {
        self.batches
            .iter()
            .filter(|b| matches!(b.outcome, BatchOutcome::Failed(_)))
            .count()
    }
}

/// Final state of one repository.
#[derive(Debug, Clone)]
pub struct RepositoryOutcome {
    /// Analysis to persist; empty when the repository failed.
    pub analysis: RepositoryAnalysis,
    /// Execution details, absent when the repository failed before planning.
    pub report: Option<DigestReport>,
    /// Error chain of a repository-level failure.
    pub failure: Option<String>,
}

/// Fetches and normalizes the diffs of every commit, sequentially.
///
/// Commits with an empty sha are skipped. A failed fetch leaves the commit
/// without diffs and records its sha.
pub async fn collect_diffs(
    diff_source: &dyn DiffSource,
    repository: &str,
    commits: &[Commit],
    config: &DigestConfig,
) -> DiffCollection {
    let mut fetched = Vec::with_capacity(commits.len());
    let mut failed = Vec::new();

    for commit in commits.iter().filter(|c| !c.sha.is_empty()) {
        match diff_source.fetch_diffs(repository, &commit.sha).await {
            Ok(files) => fetched.push((commit.sha.clone(), normalize_files(files, config))),
            Err(e) => {
                warn!(repository, sha = %commit.sha, "Diff fetch failed: {e:#}");
                failed.push(commit.sha.clone());
            }
        }
    }

    DiffCollection {
        diffs: fetched.into_iter().collect(),
        failed,
    }
}

/// Drives the digest pipeline over a diff source and a Summarizer.
pub struct Analyzer<'a> {
    diff_source: &'a dyn DiffSource,
    summarizer: &'a ClaudeClient,
    config: &'a DigestConfig,
}

impl<'a> Analyzer<'a> {
    /// Creates an analyzer.
    pub fn new(
        diff_source: &'a dyn DiffSource,
        summarizer: &'a ClaudeClient,
        config: &'a DigestConfig,
    ) -> Self {
        Self {
            diff_source,
            summarizer,
            config,
        }
    }

    /// Runs every planned batch in order and concatenates the records.
    ///
    /// A failed or empty batch contributes nothing and never stops the
    /// batches after it.
    pub async fn execute_plan(
        &self,
        repository: &str,
        plan: &DigestPlan,
        diffs: &CommitDiffMap,
        repo_context: Option<&RepoContext>,
    ) -> (Vec<ChangeRecord>, Vec<BatchReport>) {
        let mut changes = Vec::new();
        let mut reports = Vec::with_capacity(plan.batches.len());

        for batch in &plan.batches {
            let context = build_commit_context(&batch.commits, diffs, batch.token_budget, self.config);
            debug!(
                repository,
                batch = %batch.label,
                commits = batch.commits.len(),
                context_len = context.len(),
                "Summarizing batch"
            );

            let outcome = match self
                .summarizer
                .summarize_changes(repository, &context, repo_context)
                .await
            {
                Ok(records) if records.is_empty() => BatchOutcome::Empty,
                Ok(records) => {
                    let count = records.len();
                    changes.extend(records);
                    BatchOutcome::Summarized(count)
                }
                Err(e) => {
                    warn!(repository, batch = %batch.label, "Summarizer call failed: {e:#}");
                    BatchOutcome::Failed(format!("{e:#}"))
                }
            };

            reports.push(BatchReport {
                label: batch.label.clone(),
                commits: batch.commits.len(),
                token_budget: batch.token_budget,
                outcome,
            });
        }

        (changes, reports)
    }

    /// Processes one repository end to end.
    pub async fn process_repository(
        &self,
        repository: &str,
        entry: &ActivityEntry,
        repo_context: Option<&RepoContext>,
    ) -> Result<(RepositoryAnalysis, DigestReport)> {
        validate_repository(repository)?;

        let commits = &entry.activity()?.commits;
        if commits.is_empty() {
            info!(repository, "No commits");
        } else {
            info!(repository, commits = commits.len(), "Fetching diffs");
        }

        let collection = collect_diffs(self.diff_source, repository, commits, self.config).await;
        let plan = plan_repository(commits, &collection.diffs, self.config);
        let (changes, batches) = self
            .execute_plan(repository, &plan, &collection.diffs, repo_context)
            .await;

        let report = DigestReport {
            tier: plan.tier,
            total_tokens: plan.total_tokens,
            batches,
            failed_diffs: collection.failed,
        };
        let analysis = RepositoryAnalysis {
            repository: repository.to_string(),
            changes,
        };
        Ok((analysis, report))
    }

    /// Processes one repository, turning any error into an empty analysis.
    pub async fn analyze_repository(
        &self,
        repository: &str,
        entry: &ActivityEntry,
        repo_context: Option<&RepoContext>,
    ) -> RepositoryOutcome {
        match self
            .process_repository(repository, entry, repo_context)
            .await
        {
            Ok((analysis, report)) => {
                info!(
                    repository,
                    changes = analysis.changes.len(),
                    tier = report.tier.number(),
                    "Repository analyzed"
                );
                RepositoryOutcome {
                    analysis,
                    report: Some(report),
                    failure: None,
                }
            }
            Err(e) => {
                error!(repository, "Repository analysis failed: {e:#}");
                RepositoryOutcome {
                    analysis: RepositoryAnalysis::empty(repository),
                    report: None,
                    failure: Some(format!("{e:#}")),
                }
            }
        }
    }

    /// Processes every repository in input order.
    ///
    /// `after_each` sees all outcomes so far after every repository; an
    /// error from it stops the run.
    pub async fn analyze_repositories<F>(
        &self,
        activity: &ActivityData,
        contexts: &HashMap<String, RepoContext>,
        mut after_each: F,
    ) -> Result<Vec<RepositoryOutcome>>
    where
        F: FnMut(&[RepositoryOutcome]) -> Result<()>,
    {
        let mut outcomes = Vec::with_capacity(activity.len());
        for (repository, entry) in activity {
            let outcome = self
                .analyze_repository(repository, entry, contexts.get(repository))
                .await;
            outcomes.push(outcome);
            after_each(&outcomes)?;
        }
        Ok(outcomes)
    }
}
