//! Adaptive TTL Module
//!
//! Extends the lifetime of entries that are read often.

use crate::cache::CacheEntry;

/// Reads per second above which an entry counts as hot.
pub const HOT_ACCESS_RATE: f64 = 0.1;

/// Growth factor applied to a hot entry's TTL.
pub const TTL_GROWTH_FACTOR: f64 = 1.5;

/// Upper bound for adaptively extended TTLs (30 minutes).
pub const MAX_ADAPTIVE_TTL_MS: u64 = 30 * 60 * 1000;

// == Extend TTL ==
/// Extends `entry.ttl_ms` if the entry is hot at `now`.
///
/// The new TTL is `min(ttl * 1.5, 30 min)` and is only applied when it is
/// strictly larger than the current one, so a TTL never shrinks here.
/// Returns true if the TTL was extended.
pub fn maybe_extend_ttl(entry: &mut CacheEntry, now: u64) -> bool {
    let age_seconds = (entry.age_ms(now) as f64 / 1000.0).max(1.0);
    let access_rate = entry.access_count as f64 / age_seconds;

    if access_rate <= HOT_ACCESS_RATE {
        return false;
    }

    let extended = ((entry.ttl_ms as f64 * TTL_GROWTH_FACTOR) as u64).min(MAX_ADAPTIVE_TTL_MS);
    if extended > entry.ttl_ms {
        entry.ttl_ms = extended;
        true
    } else {
        false
    }
}
