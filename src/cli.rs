//! CLI interface for commit-digest.

use std::path::Path;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::DigestConfig;
use crate::github::{DiffSource, GitHubClient, StaticDiffSource};

pub mod analyze;
pub mod plan;

/// commit-digest: summarize recent commit history with an LLM.
#[derive(Parser)]
#[command(name = "commit-digest")]
#[command(about = "Summarize recent commit history into categorized changes", long_about = None)]
#[command(version)]
pub struct Cli {
    /// The command to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Fetches diffs, batches them and summarizes every repository.
    Analyze(analyze::AnalyzeCommand),
    /// Shows the tier and batches each repository would use, without AI calls.
    Plan(plan::PlanCommand),
}

impl Cli {
    /// Executes the CLI command.
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Analyze(cmd) => cmd.execute().await,
            Commands::Plan(cmd) => cmd.execute().await,
        }
    }
}

/// Opens the pre-fetched diffs file when given, otherwise the GitHub API.
pub(crate) fn open_diff_source(
    diffs: Option<&Path>,
    config: &DigestConfig,
) -> Result<Box<dyn DiffSource>> {
    match diffs {
        Some(path) => Ok(Box::new(StaticDiffSource::load(path)?)),
        None => Ok(Box::new(GitHubClient::from_env(config)?)),
    }
}
