//! # commit-digest
//!
//! Summarizes a repository's recent commit history into categorized change
//! records with an LLM, splitting unbounded commit and diff text into
//! bounded Summarizer calls.
//!
//! ## Pipeline
//!
//! 1. Fetch and normalize every commit's diff ([`github`], [`digest::normalize`]).
//! 2. Size the whole repository and pick a tier ([`digest::tier`]).
//! 3. Group commits by day and pack days into batches ([`digest::day_group`],
//!    [`digest::batch`]); oversized days are rendered under a token budget.
//! 4. Render each batch ([`digest::context`]) and summarize it ([`claude`]).
//!
//! ## Quick Start
//!
//! ```rust
//! use commit_digest::config::DigestConfig;
//! use commit_digest::data::{Commit, CommitDiffMap};
//! use commit_digest::digest::{plan_repository, Tier};
//!
//! let commits = vec![Commit {
//!     sha: "abc1234def".to_string(),
//!     message: "Add login".to_string(),
//!     author: "dev".to_string(),
//!     timestamp: Some("2024-01-15T10:00:00Z".to_string()),
//!     url: String::new(),
//! }];
//! let plan = plan_repository(&commits, &CommitDiffMap::default(), &DigestConfig::default());
//! assert_eq!(plan.tier, Tier::SinglePass);
//! assert_eq!(plan.batches.len(), 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod analyzer;
pub mod claude;
pub mod cli;
pub mod config;
pub mod data;
pub mod digest;
pub mod github;
pub mod utils;

pub use crate::cli::Cli;

/// The current version of commit-digest.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
