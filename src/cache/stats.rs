//! Cache Statistics Module
//!
//! Tracks cumulative cache counters and builds the metrics snapshot read by
//! diagnostics. Counters survive `clear()` and live as long as the cache.

use serde::Serialize;

// == Cache Stats ==
/// Cumulative cache counters.
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Number of successful cache retrievals
    pub hits: u64,
    /// Number of failed cache retrievals (missing, expired, stale or corrupt)
    pub misses: u64,
    /// Number of entries removed by the eviction policy
    pub evictions: u64,
    /// Accumulated `get` latency in milliseconds
    pub total_response_time_ms: f64,
    /// Number of `get` calls timed
    pub response_count: u64,
    /// Number of TTL extensions applied to hot entries
    pub adaptive_ttl_adjustments: u64,
    /// Bytes saved by compression across all writes
    pub compression_savings_bytes: u64,
    /// Serialized size of all written payloads before compression
    pub total_uncompressed_bytes: u64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    // == Average Response Time ==
    /// Mean `get` latency in milliseconds, 0.0 before the first call.
    pub fn average_response_time_ms(&self) -> f64 {
        if self.response_count == 0 {
            0.0
        } else {
            self.total_response_time_ms / self.response_count as f64
        }
    }

    // == Compression Ratio ==
    /// Percentage of written bytes saved by compression.
    pub fn compression_ratio(&self) -> f64 {
        if self.total_uncompressed_bytes == 0 {
            0.0
        } else {
            self.compression_savings_bytes as f64 / self.total_uncompressed_bytes as f64 * 100.0
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_evictions(&mut self, count: u64) {
        self.evictions += count;
    }

    pub fn record_adaptive_adjustment(&mut self) {
        self.adaptive_ttl_adjustments += 1;
    }

    // == Record Response Time ==
    /// Adds one timed `get` call.
    pub fn record_response_time(&mut self, elapsed_ms: f64) {
        self.total_response_time_ms += elapsed_ms;
        self.response_count += 1;
    }

    // == Record Write ==
    /// Accounts for one stored payload: its serialized size and stored size.
    pub fn record_write(&mut self, uncompressed_bytes: usize, stored_bytes: usize) {
        self.total_uncompressed_bytes += uncompressed_bytes as u64;
        self.compression_savings_bytes += uncompressed_bytes.saturating_sub(stored_bytes) as u64;
    }
}

// == Cache Metrics ==
/// Point-in-time snapshot of cache behavior.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheMetrics {
    /// hits + misses
    pub total_requests: u64,
    pub hits: u64,
    pub misses: u64,
    /// hits / total_requests, 0.0 with no requests
    pub hit_rate: f64,
    /// Mean `get` latency in milliseconds
    pub average_response_time: f64,
    /// Stored bytes across live entries
    pub memory_usage: u64,
    /// Advisory memory ceiling
    pub max_memory_bytes: u64,
    /// Percentage of written bytes saved by compression
    pub compression_ratio: f64,
    pub adaptive_ttl_adjustments: u64,
    pub evictions: u64,
    /// Readable entries: unexpired and written under the current version
    pub total_entries: usize,
}

impl CacheMetrics {
    /// Builds a snapshot from counters and the current store footprint.
    pub fn from_stats(
        stats: &CacheStats,
        memory_usage: u64,
        max_memory_bytes: u64,
        total_entries: usize,
    ) -> Self {
        Self {
            total_requests: stats.hits + stats.misses,
            hits: stats.hits,
            misses: stats.misses,
            hit_rate: stats.hit_rate(),
            average_response_time: stats.average_response_time_ms(),
            memory_usage,
            max_memory_bytes,
            compression_ratio: stats.compression_ratio(),
            adaptive_ttl_adjustments: stats.adaptive_ttl_adjustments,
            evictions: stats.evictions,
            total_entries,
        }
    }

    /// Returns true if live entries exceed the advisory memory ceiling.
    pub fn over_memory_budget(&self) -> bool {
        self.memory_usage > self.max_memory_bytes
    }
}
