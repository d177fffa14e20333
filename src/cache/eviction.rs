//! Eviction Policy Module
//!
//! Scores entries by access frequency, recency and size, and picks the
//! lowest-scoring slice of the cache to evict when it is full.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::cache::CacheEntry;

/// Percentage of `max_entries` removed by one eviction pass.
pub const EVICTION_PERCENT: usize = 20;

const ACCESS_WEIGHT: f64 = 0.4;
const RECENCY_WEIGHT: f64 = 0.4;
const SIZE_WEIGHT: f64 = 0.2;

// == Eviction Score ==
/// Computes the composite eviction score of an entry at `now`.
///
/// ```text
/// age_seconds  = max((now - stored_at) / 1000, 1)
/// access       = access_count / age_seconds
/// recency      = 1 / (now - last_accessed_at + 1)
/// size_penalty = size_bytes / 1024
/// score        = 0.4 * access + 0.4 * recency - 0.2 * size_penalty
/// ```
///
/// Lower scores are evicted first.
pub fn eviction_score(entry: &CacheEntry, now: u64) -> f64 {
    let age_seconds = (entry.age_ms(now) as f64 / 1000.0).max(1.0);
    let access_score = entry.access_count as f64 / age_seconds;
    let recency_score = 1.0 / (now.saturating_sub(entry.last_accessed_at) as f64 + 1.0);
    let size_penalty = entry.size_bytes as f64 / 1024.0;

    ACCESS_WEIGHT * access_score + RECENCY_WEIGHT * recency_score - SIZE_WEIGHT * size_penalty
}

// == Eviction Count ==
/// Number of entries one eviction pass removes for a cache of `max_entries`.
///
/// Always at least one, so a full cache can make room for the next insert.
pub fn eviction_count(max_entries: usize) -> usize {
    max_entries.saturating_mul(EVICTION_PERCENT).div_ceil(100).max(1)
}

// == Select Victims ==
/// Returns the keys of the `count` lowest-scoring entries, lowest first.
///
/// Ties are broken by key so the choice is deterministic.
pub fn select_victims(entries: &HashMap<String, CacheEntry>, now: u64, count: usize) -> Vec<String> {
    let mut scored: Vec<(&String, f64)> = entries
        .iter()
        .map(|(key, entry)| (key, eviction_score(entry, now)))
        .collect();

    scored.sort_by(|(ka, a), (kb, b)| {
        a.partial_cmp(b)
            .unwrap_or(Ordering::Equal)
            .then_with(|| ka.cmp(kb))
    });

    scored
        .into_iter()
        .take(count)
        .map(|(key, _)| key.clone())
        .collect()
}
