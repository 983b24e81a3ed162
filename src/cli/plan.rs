//! `plan` command: a dry run of the batching engine.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use crate::analyzer::collect_diffs;
use crate::config::DigestConfig;
use crate::data::load_activity;
use crate::digest::{plan_repository, DigestPlan};
use crate::github::validate_repository;
use crate::utils::preflight::check_github_token;

/// Shows how each repository would be batched, without Summarizer calls.
#[derive(Parser)]
pub struct PlanCommand {
    /// Activity JSON: `{"owner/repo": {"commits": [...]}}`.
    #[arg(long, value_name = "FILE")]
    pub activity: PathBuf,

    /// Pre-fetched diffs JSON instead of the GitHub API.
    #[arg(long, value_name = "FILE")]
    pub diffs: Option<PathBuf>,

    /// YAML configuration file.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl PlanCommand {
    /// Executes the plan command.
    pub async fn execute(self) -> Result<()> {
        let config = DigestConfig::load(self.config.as_deref())?;
        if self.diffs.is_none() {
            check_github_token()?;
        }

        let activity = load_activity(&self.activity)?;
        let diff_source = super::open_diff_source(self.diffs.as_deref(), &config)?;

        for (repository, entry) in &activity {
            if let Err(e) = validate_repository(repository) {
                println!("{repository}: skipped ({e})");
                continue;
            }
            let commits = match entry.activity() {
                Ok(activity) => &activity.commits,
                Err(e) => {
                    println!("{repository}: skipped ({e})");
                    continue;
                }
            };

            let collection = collect_diffs(diff_source.as_ref(), repository, commits, &config).await;
            let plan = plan_repository(commits, &collection.diffs, &config);
            print!("{}", format_plan(repository, &plan));
            if !collection.failed.is_empty() {
                println!(
                    "  ⚠️  {} commit diff(s) could not be fetched",
                    collection.failed.len()
                );
            }
        }

        Ok(())
    }
}

/// Renders one repository's plan for the terminal.
pub(crate) fn format_plan(repository: &str, plan: &DigestPlan) -> String {
    let mut out = format!(
        "{repository}: {} commits, ~{} tokens, {}\n",
        plan.commit_count(),
        plan.total_tokens,
        plan.tier
    );
    for (i, batch) in plan.batches.iter().enumerate() {
        let budget = batch
            .token_budget
            .map_or_else(|| "none".to_string(), |b| b.to_string());
        out.push_str(&format!(
            "  batch {}: {} ({} commits, ~{} tokens, budget: {budget})\n",
            i + 1,
            batch.label,
            batch.commits.len(),
            batch.estimated_tokens
        ));
    }
    out
}
