//! Tier selection and batch planning.
//!
//! One forward pass per repository: size the whole commit set, pick a tier,
//! then lay out the batches that tier calls for.
//!
//! | Tier | Estimated size            | Batches                                  |
//! |------|---------------------------|------------------------------------------|
//! | 1    | `< single_pass_threshold` | one batch with every commit              |
//! | 2    | `< day_split_threshold`   | day buckets packed under `batch_threshold` |
//! | 3    | otherwise                 | each large day compressed alone, then small days packed as in tier 2 |
//!
//! A day is large when its own estimate exceeds `single_pass_threshold`. A
//! large day is rendered with a token budget of
//! `single_pass_threshold / commits_in_day` instead of being split further.

use std::fmt;

use tracing::{debug, info};

use super::batch::{pack_days, DaySize};
use super::context::build_commit_context;
use super::day_group::{group_by_day, DayBuckets};
use super::token_budget::estimate_tokens;
use crate::config::DigestConfig;
use crate::data::{Commit, CommitDiffMap};

/// Batching strategy chosen from the repository's estimated size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// Everything in one call.
    SinglePass,
    /// Days packed into batches.
    PerDay,
    /// Large days compressed individually, small days packed.
    Hybrid,
}

impl Tier {
    /// Tier number used in logs and plan output.
    pub fn number(self) -> u8 {
        match self {
            Self::SinglePass => 1,
            Self::PerDay => 2,
            Self::Hybrid => 3,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::SinglePass => "single call",
            Self::PerDay => "split by day",
            Self::Hybrid => "hybrid",
        };
        write!(f, "Tier {} ({name})", self.number())
    }
}

/// One Summarizer call worth of commits.
#[derive(Debug, Clone)]
pub struct PlannedBatch {
    /// Day span or description, for logs.
    pub label: String,
    /// Commits to render, in order.
    pub commits: Vec<Commit>,
    /// Budget passed to the context builder; `None` renders everything.
    pub token_budget: Option<usize>,
    /// Unbudgeted estimate of the batch.
    pub estimated_tokens: usize,
}

/// Ordered batches for one repository.
#[derive(Debug, Clone)]
pub struct DigestPlan {
    /// Selected tier.
    pub tier: Tier,
    /// Estimated tokens of the whole repository's unbudgeted context.
    pub total_tokens: usize,
    /// Batches in execution order.
    pub batches: Vec<PlannedBatch>,
}

impl DigestPlan {
    /// Number of commits named by the plan.
    pub fn commit_count(&self) -> usize {
        self.batches.iter().map(|b| b.commits.len()).sum()
    }
}

/// Picks the tier for a repository of `total_tokens`.
pub fn select_tier(total_tokens: usize, config: &DigestConfig) -> Tier {
    if total_tokens < config.single_pass_threshold {
        Tier::SinglePass
    } else if total_tokens < config.day_split_threshold {
        Tier::PerDay
    } else {
        Tier::Hybrid
    }
}

fn size_days(buckets: DayBuckets, diffs: &CommitDiffMap, config: &DigestConfig) -> Vec<DaySize> {
    buckets
        .into_iter()
        .map(|(day, commits)| {
            let context = build_commit_context(&commits, diffs, None, config);
            let estimated_tokens = estimate_tokens(&context, config.chars_per_token);
            debug!(%day, commits = commits.len(), estimated_tokens, "Sized day bucket");
            DaySize {
                day,
                commits,
                estimated_tokens,
            }
        })
        .collect()
}

fn packed_batches(days: Vec<DaySize>, config: &DigestConfig) -> Vec<PlannedBatch> {
    pack_days(days, config.batch_threshold)
        .into_iter()
        .map(|batch| PlannedBatch {
            label: batch.label(),
            estimated_tokens: batch.estimated_tokens,
            commits: batch.commits,
            token_budget: None,
        })
        .collect()
}

fn compressed_batch(day: DaySize, config: &DigestConfig) -> PlannedBatch {
    // Bucket commit lists are never empty.
    let budget = config.single_pass_threshold / day.commits.len().max(1);
    PlannedBatch {
        label: format!("{} (compressed)", day.day),
        commits: day.commits,
        token_budget: Some(budget),
        estimated_tokens: day.estimated_tokens,
    }
}

/// Sizes a repository and lays out its Summarizer batches.
///
/// Every input commit appears in exactly one batch. An empty commit list
/// gives a tier 1 plan with no batches.
pub fn plan_repository(
    commits: &[Commit],
    diffs: &CommitDiffMap,
    config: &DigestConfig,
) -> DigestPlan {
    let full_context = build_commit_context(commits, diffs, None, config);
    let total_tokens = estimate_tokens(&full_context, config.chars_per_token);
    let tier = select_tier(total_tokens, config);
    info!(total_tokens, %tier, commits = commits.len(), "Planned repository digest");

    if commits.is_empty() {
        return DigestPlan {
            tier,
            total_tokens,
            batches: Vec::new(),
        };
    }

    let batches = match tier {
        Tier::SinglePass => vec![PlannedBatch {
            label: "all commits".to_string(),
            commits: commits.to_vec(),
            token_budget: None,
            estimated_tokens: total_tokens,
        }],
        Tier::PerDay => {
            let days = size_days(group_by_day(commits), diffs, config);
            packed_batches(days, config)
        }
        Tier::Hybrid => {
            let days = size_days(group_by_day(commits), diffs, config);
            let (large, small): (Vec<_>, Vec<_>) = days
                .into_iter()
                .partition(|day| day.estimated_tokens > config.single_pass_threshold);

            let mut batches: Vec<PlannedBatch> = large
                .into_iter()
                .map(|day| compressed_batch(day, config))
                .collect();
            batches.extend(packed_batches(small, config));
            batches
        }
    };

    DigestPlan {
        tier,
        total_tokens,
        batches,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::data::{FileChange, FileStatus};

    fn commit(sha: &str, timestamp: &str) -> Commit {
        Commit {
            sha: sha.to_string(),
            message: format!("change {sha}"),
            author: "dev".to_string(),
            timestamp: Some(timestamp.to_string()),
            url: String::new(),
        }
    }

    /// Builds `per_day` commits on each of `days` (1-based January dates),
    /// each carrying a single patch of `patch_chars` characters.
    fn fixture(days: &[u32], per_day: usize, patch_chars: usize) -> (Vec<Commit>, CommitDiffMap) {
        let mut commits = Vec::new();
        for &d in days {
            for i in 0..per_day {
                commits.push(commit(
                    &format!("d{d:02}c{i:02}"),
                    &format!("2024-01-{d:02}T{:02}:00:00Z", i % 24),
                ));
            }
        }
        let diffs = commits
            .iter()
            .map(|c| {
                (
                    c.sha.clone(),
                    vec![FileChange {
                        filename: "src/lib.rs".to_string(),
                        status: FileStatus::Modified,
                        additions: 1,
                        deletions: 0,
                        patch: "p".repeat(patch_chars),
                    }],
                )
            })
            .collect();
        (commits, diffs)
    }

    fn all_shas(plan: &DigestPlan) -> Vec<String> {
        plan.batches
            .iter()
            .flat_map(|b| b.commits.iter().map(|c| c.sha.clone()))
            .collect()
    }

    #[test]
    fn tier_boundaries() {
        let config = DigestConfig::default();
        assert_eq!(select_tier(0, &config), Tier::SinglePass);
        assert_eq!(select_tier(50_000, &config), Tier::SinglePass);
        assert_eq!(select_tier(99_999, &config), Tier::SinglePass);
        assert_eq!(select_tier(100_000, &config), Tier::PerDay);
        assert_eq!(select_tier(250_000, &config), Tier::PerDay);
        assert_eq!(select_tier(699_999, &config), Tier::PerDay);
        assert_eq!(select_tier(700_000, &config), Tier::Hybrid);
    }

    #[test]
    fn tier_display() {
        assert_eq!(Tier::SinglePass.to_string(), "Tier 1 (single call)");
        assert_eq!(Tier::Hybrid.number(), 3);
    }

    #[test]
    fn empty_repository_has_no_batches() {
        let plan = plan_repository(&[], &CommitDiffMap::default(), &DigestConfig::default());
        assert_eq!(plan.tier, Tier::SinglePass);
        assert_eq!(plan.total_tokens, 0);
        assert!(plan.batches.is_empty());
    }

    #[test]
    fn small_repository_is_single_pass() {
        // 3 days x 5 commits x ~10k chars = ~50k tokens.
        let (commits, diffs) = fixture(&[1, 2, 3], 5, 10_000);
        let config = DigestConfig::default();
        let plan = plan_repository(&commits, &diffs, &config);

        assert_eq!(plan.tier, Tier::SinglePass);
        assert!(plan.total_tokens > 45_000 && plan.total_tokens < 100_000);
        assert_eq!(plan.batches.len(), 1);
        assert_eq!(plan.batches[0].token_budget, None);
        assert_eq!(all_shas(&plan), commits.iter().map(|c| c.sha.clone()).collect::<Vec<_>>());
    }

    #[test]
    fn medium_repository_splits_by_day() {
        // 3 days at ~60k tokens each: every day overflows the 90k batch
        // threshold when added to the previous one.
        let (commits, diffs) = fixture(&[1, 2, 3], 4, 45_000);
        let config = DigestConfig::default();
        let plan = plan_repository(&commits, &diffs, &config);

        assert_eq!(plan.tier, Tier::PerDay);
        assert_eq!(plan.batches.len(), 3);
        let labels: Vec<_> = plan.batches.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["2024-01-01", "2024-01-02", "2024-01-03"]);
        assert!(plan.batches.iter().all(|b| b.token_budget.is_none()));
        assert_eq!(plan.commit_count(), commits.len());
    }

    #[test]
    fn per_day_merges_small_days() {
        // Six days at ~20k tokens each: four fit under 90k, the fifth spills.
        let (commits, diffs) = fixture(&[1, 2, 3, 4, 5, 6], 2, 30_000);
        let config = DigestConfig::default();
        let plan = plan_repository(&commits, &diffs, &config);

        assert_eq!(plan.tier, Tier::PerDay);
        assert_eq!(plan.batches.len(), 2);
        assert_eq!(plan.batches[0].label, "2024-01-01..2024-01-04");
        assert_eq!(plan.batches[1].label, "2024-01-05..2024-01-06");
        assert_eq!(all_shas(&plan), commits.iter().map(|c| c.sha.clone()).collect::<Vec<_>>());
    }

    #[test]
    fn large_days_compressed_with_per_commit_budget() {
        // 5 days x 10 commits x ~15k tokens = ~150k tokens per day, ~750k total.
        let (commits, diffs) = fixture(&[1, 2, 3, 4, 5], 10, 45_000);
        let config = DigestConfig::default();
        let plan = plan_repository(&commits, &diffs, &config);

        assert_eq!(plan.tier, Tier::Hybrid);
        assert_eq!(plan.batches.len(), 5);
        for batch in &plan.batches {
            assert_eq!(batch.commits.len(), 10);
            assert_eq!(batch.token_budget, Some(10_000));
            assert!(batch.label.ends_with("(compressed)"));
        }
    }

    #[test]
    fn hybrid_runs_large_days_before_packed_small_days() {
        // Day 2 is huge; days 1 and 3 are small. Scaled-down thresholds.
        let config = DigestConfig {
            single_pass_threshold: 1_000,
            day_split_threshold: 2_000,
            batch_threshold: 900,
            ..DigestConfig::default()
        };
        let (mut commits, large_diffs) = fixture(&[2], 4, 2_000);
        let (small_commits, small_diffs) = fixture(&[1, 3], 1, 300);
        commits.extend(small_commits);

        let diffs: CommitDiffMap = commits
            .iter()
            .map(|c| {
                let files = large_diffs
                    .get(&c.sha)
                    .or_else(|| small_diffs.get(&c.sha))
                    .unwrap()
                    .to_vec();
                (c.sha.clone(), files)
            })
            .collect();

        let plan = plan_repository(&commits, &diffs, &config);
        assert_eq!(plan.tier, Tier::Hybrid);

        let labels: Vec<_> = plan.batches.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["2024-01-02 (compressed)", "2024-01-01..2024-01-03"]);
        assert_eq!(plan.batches[0].token_budget, Some(250));
        assert_eq!(plan.batches[1].token_budget, None);
        assert_eq!(plan.commit_count(), commits.len());
    }

    #[test]
    fn undated_commits_planned_last() {
        let config = DigestConfig {
            single_pass_threshold: 10,
            day_split_threshold: 1_000_000,
            batch_threshold: 1,
            ..DigestConfig::default()
        };
        let mut commits = vec![commit("late", "2024-02-01T00:00:00Z")];
        commits.insert(0, Commit { timestamp: None, ..commit("undated", "") });
        commits.push(commit("early", "2024-01-01T00:00:00Z"));

        let plan = plan_repository(&commits, &CommitDiffMap::default(), &config);
        assert_eq!(plan.tier, Tier::PerDay);
        assert_eq!(all_shas(&plan), vec!["early", "late", "undated"]);
    }
}
