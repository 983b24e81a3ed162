//! Tiered batching and context budgeting.
//!
//! Turns a repository's commits and normalized diffs into an ordered
//! [`DigestPlan`] of batches, each small enough for one Summarizer call,
//! and renders each batch into the text blob handed to the model.

pub mod batch;
pub mod context;
pub mod day_group;
pub mod normalize;
pub mod tier;
pub mod token_budget;

pub use batch::{pack_days, Batch, DaySize};
pub use context::{build_commit_context, COMMIT_SEPARATOR, OMITTED_DIFF_NOTICE};
pub use day_group::{group_by_day, parse_day, DayBuckets, DayKey};
pub use normalize::{is_non_code_file, normalize_files, TRUNCATED_DIFF_MARKER};
pub use tier::{plan_repository, select_tier, DigestPlan, PlannedBatch, Tier};
pub use token_budget::estimate_tokens;
