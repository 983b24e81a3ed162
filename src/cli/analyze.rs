//! `analyze` command.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

use crate::analyzer::{Analyzer, RepositoryOutcome};
use crate::claude::create_default_claude_client;
use crate::config::DigestConfig;
use crate::data::{load_activity, load_repo_contexts, save_analyses, RepositoryAnalysis};
use crate::utils::preflight::{check_ai_credentials, check_github_token};

/// Summarizes the commit activity of every repository.
#[derive(Parser)]
pub struct AnalyzeCommand {
    /// Activity JSON: `{"owner/repo": {"commits": [...]}}`.
    #[arg(long, value_name = "FILE")]
    pub activity: PathBuf,

    /// Repository context JSON: `{"owner/repo": {"summary": .., "stack": ..}}`.
    #[arg(long, value_name = "FILE")]
    pub contexts: Option<PathBuf>,

    /// Pre-fetched diffs JSON instead of the GitHub API.
    #[arg(long, value_name = "FILE")]
    pub diffs: Option<PathBuf>,

    /// YAML configuration file.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Claude model (overrides CLAUDE_MODEL and the config file).
    #[arg(long)]
    pub model: Option<String>,

    /// Writes analyses here after every repository instead of printing them.
    #[arg(long, short, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

impl AnalyzeCommand {
    /// Executes the analyze command.
    pub async fn execute(self) -> Result<()> {
        let config = DigestConfig::load(self.config.as_deref())?;

        check_ai_credentials()?;
        if self.diffs.is_none() {
            check_github_token()?;
        }

        let activity = load_activity(&self.activity)?;
        let contexts = match &self.contexts {
            Some(path) => load_repo_contexts(path)?,
            None => HashMap::new(),
        };

        let diff_source = super::open_diff_source(self.diffs.as_deref(), &config)?;
        let summarizer = create_default_claude_client(&config, self.model)?;

        eprintln!(
            "🔍 Analyzing {} repositories (model: {})",
            activity.len(),
            summarizer.model()
        );

        let output = self.output;
        let analyzer = Analyzer::new(diff_source.as_ref(), &summarizer, &config);
        let outcomes = analyzer
            .analyze_repositories(&activity, &contexts, |so_far| {
                if let Some(last) = so_far.last() {
                    print_outcome(last);
                }
                match &output {
                    Some(path) => persist(path, so_far),
                    None => Ok(()),
                }
            })
            .await?;

        let analyses = collect_analyses(&outcomes);
        if output.is_none() {
            let json = serde_json::to_string_pretty(&analyses)
                .context("Failed to serialize analyses to JSON")?;
            println!("{json}");
        }

        let total_changes: usize = analyses.iter().map(|a| a.changes.len()).sum();
        eprintln!(
            "✅ Analysis complete: {total_changes} total changes across {} repositories",
            analyses.len()
        );
        if let Some(path) = &output {
            eprintln!("💾 Analyses saved to: {}", path.display());
        }

        Ok(())
    }
}

fn collect_analyses(outcomes: &[RepositoryOutcome]) -> Vec<RepositoryAnalysis> {
    outcomes.iter().map(|o| o.analysis.clone()).collect()
}

fn persist(path: &Path, outcomes: &[RepositoryOutcome]) -> Result<()> {
    save_analyses(path, &collect_analyses(outcomes))
}

fn print_outcome(outcome: &RepositoryOutcome) {
    let repository = &outcome.analysis.repository;

    if let Some(failure) = &outcome.failure {
        eprintln!("❌ Error analyzing {repository}: {failure}");
        return;
    }

    let changes = outcome.analysis.changes.len();
    match &outcome.report {
        Some(report) => {
            eprintln!(
                "✅ {repository}: {changes} changes identified ({}, ~{} tokens, {} batches)",
                report.tier,
                report.total_tokens,
                report.batches.len()
            );
            let failed = report.failed_batches();
            if failed > 0 {
                eprintln!("   ⚠️  {failed} batch(es) failed and contributed no changes");
            }
            if !report.failed_diffs.is_empty() {
                eprintln!(
                    "   ⚠️  {} commit diff(s) could not be fetched",
                    report.failed_diffs.len()
                );
            }
        }
        None => eprintln!("✅ {repository}: {changes} changes identified"),
    }
}
