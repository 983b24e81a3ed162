//! Day bucketing of commits.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::data::Commit;

/// Calendar day a commit belongs to.
///
/// Dated keys order chronologically and [`DayKey::Unknown`] sorts after
/// all of them, so undated commits are always processed last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DayKey {
    /// Date portion of a parseable timestamp.
    Date(NaiveDate),
    /// Missing or unparseable timestamp.
    Unknown,
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            Self::Unknown => f.write_str("unknown"),
        }
    }
}

/// Commits grouped by day, iterated in day order.
pub type DayBuckets = BTreeMap<DayKey, Vec<Commit>>;

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Extracts the calendar date of an ISO-8601 timestamp.
///
/// Accepts RFC 3339 with `Z` or a numeric offset, offset-free date-times,
/// and bare dates. The date is taken as written, without converting to
/// another zone.
pub fn parse_day(timestamp: &str) -> Option<NaiveDate> {
    let timestamp = timestamp.trim();
    if timestamp.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(timestamp) {
        return Some(dt.date_naive());
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(timestamp, fmt).ok())
        .map(|dt| dt.date())
        .or_else(|| NaiveDate::parse_from_str(timestamp, "%Y-%m-%d").ok())
}

/// Partitions commits into day buckets.
///
/// Within a bucket commits keep their input order; nothing is dropped,
/// reordered or deduplicated.
pub fn group_by_day(commits: &[Commit]) -> DayBuckets {
    let mut buckets = DayBuckets::new();
    for commit in commits {
        let key = commit
            .timestamp
            .as_deref()
            .and_then(parse_day)
            .map_or(DayKey::Unknown, DayKey::Date);
        buckets.entry(key).or_default().push(commit.clone());
    }
    buckets
}
