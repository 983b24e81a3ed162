//! Greedy packing of day buckets into Summarizer batches.
//!
//! Walks days in key order, merging consecutive days into one batch until
//! the next day would push the batch past the threshold. Days are never
//! split: a single day larger than the threshold still lands in one batch,
//! so a batch may legitimately exceed the threshold.

use super::day_group::DayKey;
use crate::data::Commit;

/// A day bucket with its estimated size.
#[derive(Debug, Clone)]
pub struct DaySize {
    /// Day the commits belong to.
    pub day: DayKey,
    /// Commits of that day, in input order.
    pub commits: Vec<Commit>,
    /// Estimated tokens of the day's unbudgeted context.
    pub estimated_tokens: usize,
}

/// A group of commits sent in one Summarizer call.
#[derive(Debug, Clone, Default)]
pub struct Batch {
    /// Days merged into this batch, ascending.
    pub days: Vec<DayKey>,
    /// Commits of all merged days, day by day.
    pub commits: Vec<Commit>,
    /// Sum of the merged days' estimates.
    pub estimated_tokens: usize,
}

impl Batch {
    /// Human-readable span of days, e.g. `2024-01-15..2024-01-17`.
    pub fn label(&self) -> String {
        match (self.days.first(), self.days.last()) {
            (Some(first), Some(last)) if first != last => format!("{first}..{last}"),
            (Some(first), _) => first.to_string(),
            _ => String::new(),
        }
    }

    fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    fn push_day(&mut self, day: DaySize) {
        self.days.push(day.day);
        self.commits.extend(day.commits);
        self.estimated_tokens += day.estimated_tokens;
    }
}

/// Packs days into batches under `threshold`.
///
/// Days are sorted by key first. The running batch is flushed before a day
/// only when it is non-empty and adding the day would exceed `threshold`.
pub fn pack_days(mut days: Vec<DaySize>, threshold: usize) -> Vec<Batch> {
    days.sort_by_key(|day| day.day);

    let mut batches = Vec::new();
    let mut current = Batch::default();

    for day in days {
        if !current.is_empty() && current.estimated_tokens + day.estimated_tokens > threshold {
            batches.push(std::mem::take(&mut current));
        }
        current.push_day(day);
    }

    if !current.is_empty() {
        batches.push(current);
    }

    batches
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn key(d: u32) -> DayKey {
        DayKey::Date(NaiveDate::from_ymd_opt(2024, 1, d).unwrap())
    }

    fn day(d: u32, tokens: usize) -> DaySize {
        DaySize {
            day: key(d),
            commits: vec![Commit {
                sha: format!("sha-{d}"),
                message: String::new(),
                author: "dev".to_string(),
                timestamp: None,
                url: String::new(),
            }],
            estimated_tokens: tokens,
        }
    }

    fn day_spans(batches: &[Batch]) -> Vec<Vec<DayKey>> {
        batches.iter().map(|b| b.days.clone()).collect()
    }

    #[test]
    fn small_days_merge_into_one_batch() {
        let batches = pack_days(vec![day(1, 10_000), day(2, 20_000), day(3, 30_000)], 90_000);
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].estimated_tokens, 60_000);
        assert_eq!(batches[0].commits.len(), 3);
        assert_eq!(batches[0].label(), "2024-01-01..2024-01-03");
    }

    #[test]
    fn flushes_before_overflowing_day() {
        // 60k + 60k > 90k: every day starts a new batch.
        let batches = pack_days(vec![day(1, 60_000), day(2, 60_000), day(3, 60_000)], 90_000);
        assert_eq!(day_spans(&batches), vec![vec![key(1)], vec![key(2)], vec![key(3)]]);
        assert!(batches.iter().all(|b| b.estimated_tokens == 60_000));
    }

    #[test]
    fn exactly_at_threshold_does_not_flush() {
        let batches = pack_days(vec![day(1, 45_000), day(2, 45_000), day(3, 1)], 90_000);
        assert_eq!(day_spans(&batches), vec![vec![key(1), key(2)], vec![key(3)]]);
    }

    #[test]
    fn oversized_day_is_never_split() {
        let batches = pack_days(vec![day(1, 150_000), day(2, 10_000)], 90_000);
        assert_eq!(day_spans(&batches), vec![vec![key(1)], vec![key(2)]]);
        assert_eq!(batches[0].estimated_tokens, 150_000);
    }

    #[test]
    fn oversized_day_joins_nonempty_batch_only_after_flush() {
        // Small day first, then an oversized one: flush, then the big day
        // sits alone, and the next small day flushes it.
        let batches = pack_days(vec![day(1, 5), day(2, 500), day(3, 5)], 100);
        assert_eq!(day_spans(&batches), vec![vec![key(1)], vec![key(2)], vec![key(3)]]);
    }

    #[test]
    fn days_sorted_before_packing() {
        let batches = pack_days(vec![day(3, 1), day(1, 1), DaySize { day: DayKey::Unknown, ..day(2, 1) }], 90_000);
        assert_eq!(batches[0].days, vec![key(1), key(3), DayKey::Unknown]);
        assert_eq!(batches[0].label(), "2024-01-01..unknown");
    }

    #[test]
    fn empty_input_gives_no_batches() {
        assert!(pack_days(Vec::new(), 90_000).is_empty());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn covers_every_day_once_in_order(
                sizes in prop::collection::vec(0_usize..200_000, 0..25),
                threshold in 1_usize..200_000,
            ) {
                let days: Vec<_> = sizes
                    .iter()
                    .enumerate()
                    .map(|(i, &s)| day(i as u32 + 1, s))
                    .collect();
                let batches = pack_days(days, threshold);

                let flattened: Vec<DayKey> = batches.iter().flat_map(|b| b.days.clone()).collect();
                let expected: Vec<DayKey> = (1..=sizes.len() as u32).map(key).collect();
                prop_assert_eq!(flattened, expected);

                for b in &batches {
                    // Only single-day batches may overshoot.
                    prop_assert!(b.estimated_tokens <= threshold || b.days.len() == 1);
                }
            }
        }
    }
}
