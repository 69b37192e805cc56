//! Stats aggregation over store snapshots.
//!
//! Counts are recomputed from a snapshot on every call. Grouped counts use a
//! `BTreeMap` so the JSON output is ordered and stable.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

use crate::store::Expiring;

/// Trailing window for the `last_24h` counters.
pub const STATS_WINDOW: Duration = Duration::from_secs(24 * 60 * 60);

/// Count records per key. Every record lands in exactly one bucket.
pub fn count_by<R, F>(records: &[R], key: F) -> BTreeMap<String, usize>
where
    F: Fn(&R) -> &str,
{
    let mut counts = BTreeMap::new();
    for record in records {
        *counts.entry(key(record).to_string()).or_insert(0) += 1;
    }
    counts
}

/// Count records created strictly after `now - window`.
pub fn count_since<R: Expiring>(records: &[R], now: DateTime<Utc>, window: Duration) -> usize {
    let Ok(window) = TimeDelta::from_std(window) else {
        return records.len();
    };
    records
        .iter()
        .filter(|r| now.signed_duration_since(r.created_at()) < window)
        .count()
}

#[cfg(test)]
#[path = "stats_test.rs"]
mod tests;
