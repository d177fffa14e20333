//! Response Cache Module
//!
//! Main cache engine: HashMap storage with TTL and schema-version expiry,
//! adaptive TTL for hot entries, score-based eviction and payload compression.
//!
//! The cache fails open. Serialization, decompression and deserialization
//! problems are logged and surface as misses or skipped writes, never as
//! errors to the caller.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn, Level};

use crate::cache::adaptive::maybe_extend_ttl;
use crate::cache::entry::Payload;
use crate::cache::eviction::{eviction_count, select_victims};
use crate::cache::{CacheEntry, CacheMetrics, CacheStats, Clock, SystemClock};
use crate::config::CacheConfig;
use crate::error::Result;

// == Response Cache ==
/// Bounded, self-expiring, self-compressing response cache.
#[derive(Debug)]
pub struct ResponseCache {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// Cumulative counters, kept across `clear()`
    stats: CacheStats,
    /// Construction-time settings
    config: CacheConfig,
    /// Version tag entries must carry to be readable
    current_version: String,
    /// Time source
    clock: Arc<dyn Clock>,
}

impl ResponseCache {
    // == Constructor ==
    /// Creates a cache driven by the system clock.
    pub fn new(config: CacheConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Creates a cache driven by the given clock.
    pub fn with_clock(config: CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: HashMap::new(),
            stats: CacheStats::new(),
            current_version: config.schema_version.clone(),
            config,
            clock,
        }
    }

    // == Get ==
    /// Retrieves and deserializes the value stored under `key`.
    ///
    /// Returns `None` if the key is missing, expired, written under an older
    /// schema version, or if its payload can no longer be decoded. Expired and
    /// corrupt entries are removed. Hits update access bookkeeping and may
    /// extend the entry's TTL.
    pub fn get<T: DeserializeOwned>(&mut self, key: &str) -> Option<T> {
        let started = Instant::now();
        let value = self.lookup(key);
        self.stats
            .record_response_time(started.elapsed().as_secs_f64() * 1000.0);
        value
    }

    fn lookup<T: DeserializeOwned>(&mut self, key: &str) -> Option<T> {
        let now = self.clock.now_ms();

        let Some(entry) = self.entries.get_mut(key) else {
            self.stats.record_miss();
            return None;
        };

        if entry.is_stale(now, &self.current_version) {
            self.entries.remove(key);
            self.stats.record_miss();
            debug!(key, "Cache entry expired");
            return None;
        }

        match decode_payload::<T>(&entry.payload) {
            Ok(value) => {
                entry.record_access(now);
                if self.config.adaptive_ttl_enabled && maybe_extend_ttl(entry, now) {
                    self.stats.record_adaptive_adjustment();
                    debug!(
                        key,
                        ttl_ms = entry.ttl_ms,
                        ttl_remaining_ms = entry.ttl_remaining_ms(now),
                        "Extended TTL of hot entry"
                    );
                }
                self.stats.record_hit();
                Some(value)
            }
            Err(e) => {
                warn!(key, error = %e, "Dropping unreadable cache entry");
                self.entries.remove(key);
                self.stats.record_miss();
                None
            }
        }
    }

    // == Set ==
    /// Stores `value` under `key`, replacing any existing entry.
    ///
    /// `ttl_ms` overrides the configured default. A TTL of zero means the
    /// value would expire immediately, so nothing is stored and any previous
    /// entry for the key is dropped. Values that fail to serialize are
    /// skipped with a warning.
    pub fn set<T: Serialize + ?Sized>(&mut self, key: impl Into<String>, value: &T, ttl_ms: Option<u64>) {
        let key = key.into();
        let ttl_ms = ttl_ms.unwrap_or(self.config.default_ttl_ms);

        if ttl_ms == 0 || self.config.max_entries == 0 {
            debug!(key = %key, ttl_ms, "Skipping cache write that can never be read");
            self.entries.remove(&key);
            return;
        }

        self.cleanup_expired();

        let text = match serde_json::to_string(value) {
            Ok(text) => text,
            Err(e) => {
                warn!(key = %key, error = %e, "Skipping cache write: value failed to serialize");
                return;
            }
        };

        let uncompressed_len = text.len();
        let payload = self.encode(text);
        self.stats.record_write(uncompressed_len, payload.size_bytes());

        let now = self.clock.now_ms();
        if !self.entries.contains_key(&key) && self.entries.len() >= self.config.max_entries {
            self.evict(now);
        }

        let entry = CacheEntry::new(payload, now, ttl_ms, self.current_version.clone());
        self.entries.insert(key, entry);

        // Full scan, so skipped unless debug logging is on
        if tracing::enabled!(Level::DEBUG) {
            let metrics = self.stats();
            if metrics.over_memory_budget() {
                debug!(
                    memory_usage = metrics.memory_usage,
                    max_memory_bytes = metrics.max_memory_bytes,
                    "Cache is above its advisory memory ceiling"
                );
            }
        }
    }

    /// Serializes into the stored form, compressing above the threshold
    /// when that makes the payload strictly smaller.
    fn encode(&self, text: String) -> Payload {
        if text.len() <= self.config.compression_threshold_bytes {
            return Payload::Plain(text);
        }

        let codec = self.config.codec;
        let bytes = codec.compress(&text);
        if bytes.len() < text.len() {
            debug!(%codec, from = text.len(), to = bytes.len(), "Compressed cache payload");
            Payload::Compressed { codec, bytes }
        } else {
            Payload::Plain(text)
        }
    }

    // == Evict ==
    /// Removes the lowest-scoring slice of entries.
    fn evict(&mut self, now: u64) {
        let victims = select_victims(&self.entries, now, eviction_count(self.config.max_entries));
        for key in &victims {
            self.entries.remove(key);
        }
        self.stats.record_evictions(victims.len() as u64);
        debug!(evicted = victims.len(), remaining = self.entries.len(), "Eviction pass complete");
    }

    // == Delete ==
    /// Removes an entry by key. Returns true if an entry was present.
    pub fn delete(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    // == Clear ==
    /// Removes every entry. Cumulative statistics are kept.
    pub fn clear(&mut self) {
        let removed = self.entries.len();
        self.entries.clear();
        info!(removed, "Cache cleared");
    }

    // == Schema Version ==
    /// Returns the version tag entries must carry to be readable.
    pub fn schema_version(&self) -> &str {
        &self.current_version
    }

    /// Switches the current schema version. Entries written under any other
    /// version become unreadable at once and are swept lazily.
    pub fn set_schema_version(&mut self, version: impl Into<String>) {
        let version = version.into();
        if version != self.current_version {
            info!(from = %self.current_version, to = %version, "Cache schema version changed");
            self.current_version = version;
        }
    }

    // == Cleanup Expired ==
    /// Removes all entries that are expired or carry a stale schema version.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let now = self.clock.now_ms();
        let before = self.entries.len();
        let version = &self.current_version;
        self.entries
            .retain(|_, entry| !entry.is_stale(now, version));
        before - self.entries.len()
    }

    // == Stats ==
    /// Returns a snapshot of cache metrics.
    pub fn stats(&self) -> CacheMetrics {
        CacheMetrics::from_stats(
            &self.stats,
            self.memory_usage(),
            self.config.max_memory_bytes,
            self.live_len(),
        )
    }

    // == Memory Usage ==
    /// Stored bytes across live (unexpired, current-version) entries.
    pub fn memory_usage(&self) -> u64 {
        let now = self.clock.now_ms();
        self.entries
            .values()
            .filter(|entry| !entry.is_stale(now, &self.current_version))
            .map(|entry| entry.size_bytes as u64)
            .sum()
    }

    // == Inspection ==
    /// Returns the entry under `key` without touching its bookkeeping.
    pub fn entry(&self, key: &str) -> Option<&CacheEntry> {
        self.entries.get(key)
    }

    /// Current TTL in milliseconds of the entry under `key`.
    pub fn ttl_of(&self, key: &str) -> Option<u64> {
        self.entry(key).map(|entry| entry.ttl_ms)
    }

    /// Stored (possibly compressed) size in bytes of the entry under `key`.
    pub fn stored_size_of(&self, key: &str) -> Option<usize> {
        self.entry(key).map(|entry| entry.size_bytes)
    }

    // == Length ==
    /// Returns the number of entries physically held, including ones that
    /// are logically absent but not swept yet.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns the number of readable entries.
    pub fn live_len(&self) -> usize {
        let now = self.clock.now_ms();
        self.entries
            .values()
            .filter(|entry| !entry.is_stale(now, &self.current_version))
            .count()
    }

    // == Is Empty ==
    /// Returns true if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn entry_mut(&mut self, key: &str) -> Option<&mut CacheEntry> {
        self.entries.get_mut(key)
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

fn decode_payload<T: DeserializeOwned>(payload: &Payload) -> Result<T> {
    let text = payload.to_text()?;
    Ok(serde_json::from_str(&text)?)
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CompressionCodec, ManualClock};
    use serde::Deserialize;
    use serde_json::{json, Value};

    const START: u64 = 1_700_000_000_000;

    fn test_cache(max_entries: usize) -> (ResponseCache, ManualClock) {
        let clock = ManualClock::new(START);
        let config = CacheConfig {
            max_entries,
            default_ttl_ms: 60_000,
            compression_threshold_bytes: 512,
            ..CacheConfig::default()
        };
        (ResponseCache::with_clock(config, Arc::new(clock.clone())), clock)
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct NavMenu {
        items: Vec<u32>,
    }

    #[test]
    fn test_store_new() {
        let (cache, _) = test_cache(100);
        assert_eq!(cache.len(), 0);
        assert!(cache.is_empty());
        assert_eq!(cache.schema_version(), "1");
    }

    #[test]
    fn test_set_and_get_typed_value() {
        let (mut cache, _) = test_cache(100);

        cache.set("nav", &NavMenu { items: vec![1, 2, 3] }, Some(5_000));
        let value: Option<NavMenu> = cache.get("nav");

        assert_eq!(value, Some(NavMenu { items: vec![1, 2, 3] }));
        assert_eq!(cache.stats().hits, 1);
    }

    #[test]
    fn test_get_nonexistent_is_miss() {
        let (mut cache, _) = test_cache(100);

        assert_eq!(cache.get::<Value>("nonexistent"), None);
        let stats = cache.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 0);
    }

    #[test]
    fn test_ttl_expiration_removes_entry() {
        let (mut cache, clock) = test_cache(100);

        cache.set("nav", &json!({"items": [1, 2, 3]}), Some(5_000));
        clock.advance(6_000);

        assert_eq!(cache.get::<Value>("nav"), None);
        assert_eq!(cache.stats().misses, 1);
        assert!(cache.is_empty(), "Expired entry should be removed on read");
    }

    #[test]
    fn test_default_ttl_applies() {
        let (mut cache, clock) = test_cache(100);

        cache.set("k", &1u32, None);
        assert_eq!(cache.ttl_of("k"), Some(60_000));

        clock.advance(60_000);
        assert_eq!(cache.get::<u32>("k"), None);
    }

    #[test]
    fn test_zero_ttl_stores_nothing() {
        let (mut cache, _) = test_cache(100);

        cache.set("k", &1u32, None);
        cache.set("k", &2u32, Some(0));

        assert!(cache.is_empty());
        assert_eq!(cache.get::<u32>("k"), None);
    }

    #[test]
    fn test_overwrite_resets_counters() {
        let (mut cache, _) = test_cache(100);

        cache.set("k", "first", None);
        let _: Option<String> = cache.get("k");
        let _: Option<String> = cache.get("k");
        cache.set("k", "second", None);

        assert_eq!(cache.entry("k").map(|e| e.access_count), Some(0));
        assert_eq!(cache.get::<String>("k").as_deref(), Some("second"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_version_bump_invalidates() {
        let (mut cache, _) = test_cache(100);

        cache.set("k", &42u32, None);
        cache.set_schema_version("2");

        assert_eq!(cache.get::<u32>("k"), None);
        cache.set("k", &43u32, None);
        assert_eq!(cache.get::<u32>("k"), Some(43));
    }

    #[test]
    fn test_delete_and_clear() {
        let (mut cache, _) = test_cache(100);

        cache.set("a", &1u32, None);
        cache.set("b", &2u32, None);
        let _: Option<u32> = cache.get("a");

        assert!(cache.delete("a"));
        assert!(!cache.delete("a"));
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
        // Metrics survive clear
        assert_eq!(cache.stats().hits, 1);
    }

    #[test]
    fn test_capacity_triggers_eviction_of_cold_entry() {
        let (mut cache, clock) = test_cache(5);

        for i in 0..5 {
            cache.set(format!("key{}", i), &i, None);
        }
        clock.advance(10_000);
        for i in [0, 1, 3, 4] {
            let _: Option<i32> = cache.get(&format!("key{}", i));
        }

        cache.set("key5", &5, None);

        assert_eq!(cache.len(), 5);
        assert!(cache.entry("key2").is_none(), "Coldest entry should be evicted");
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn test_overwrite_at_capacity_does_not_evict() {
        let (mut cache, _) = test_cache(3);

        cache.set("a", &1, None);
        cache.set("b", &2, None);
        cache.set("c", &3, None);
        cache.set("b", &20, None);

        assert_eq!(cache.len(), 3);
        assert_eq!(cache.stats().evictions, 0);
    }

    #[test]
    fn test_large_payload_is_compressed() {
        let (mut cache, _) = test_cache(100);
        let big = "a".repeat(2000);

        cache.set("big", &big, None);

        let stored = cache.stored_size_of("big").unwrap();
        assert!(stored < 2000);
        assert!(cache.entry("big").unwrap().payload.is_compressed());
        assert_eq!(cache.get::<String>("big"), Some(big));
        assert!(cache.stats().compression_ratio > 0.0);
    }

    #[test]
    fn test_run_length_codec_roundtrip() {
        let clock = ManualClock::new(START);
        let config = CacheConfig {
            compression_threshold_bytes: 512,
            codec: CompressionCodec::RunLength,
            ..CacheConfig::default()
        };
        let mut cache = ResponseCache::with_clock(config, Arc::new(clock));
        let big = "a".repeat(2000);

        cache.set("big", &big, None);

        // "\"" + "2000a" + "\""
        assert_eq!(cache.stored_size_of("big"), Some(7));
        assert_eq!(cache.get::<String>("big"), Some(big));
    }

    #[test]
    fn test_incompressible_payload_stored_plain() {
        let config = CacheConfig {
            codec: CompressionCodec::RunLength,
            compression_threshold_bytes: 512,
            ..CacheConfig::default()
        };
        let mut cache = ResponseCache::with_clock(config, Arc::new(ManualClock::new(START)));
        let text: String = (0..1000).map(|i| char::from(b'a' + (i % 26) as u8)).collect();

        cache.set("text", &text, None);

        assert!(!cache.entry("text").unwrap().payload.is_compressed());
        assert_eq!(cache.stored_size_of("text"), Some(text.len() + 2));
    }

    #[test]
    fn test_serialization_failure_is_skipped() {
        let (mut cache, _) = test_cache(100);
        let mut bad: HashMap<(u8, u8), u8> = HashMap::new();
        bad.insert((1, 2), 3);

        cache.set("bad", &bad, None);

        assert!(cache.is_empty());
    }

    #[test]
    fn test_type_mismatch_is_miss_and_drops_entry() {
        let (mut cache, _) = test_cache(100);

        cache.set("k", "not a number", None);

        assert_eq!(cache.get::<u64>("k"), None);
        assert!(cache.is_empty());
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn test_adaptive_ttl_on_hot_key() {
        let (mut cache, clock) = test_cache(100);

        cache.set("hot", &"value", Some(10_000));
        for _ in 0..20 {
            clock.advance(250);
            let _: Option<String> = cache.get("hot");
        }

        assert!(cache.ttl_of("hot").unwrap() > 10_000);
        assert!(cache.stats().adaptive_ttl_adjustments >= 1);
    }

    #[test]
    fn test_adaptive_ttl_disabled() {
        let clock = ManualClock::new(START);
        let config = CacheConfig {
            adaptive_ttl_enabled: false,
            ..CacheConfig::default()
        };
        let mut cache = ResponseCache::with_clock(config, Arc::new(clock.clone()));

        cache.set("hot", &1u8, Some(10_000));
        for _ in 0..20 {
            clock.advance(100);
            let _: Option<u8> = cache.get("hot");
        }

        assert_eq!(cache.ttl_of("hot"), Some(10_000));
        assert_eq!(cache.stats().adaptive_ttl_adjustments, 0);
    }

    #[test]
    fn test_cleanup_expired() {
        let (mut cache, clock) = test_cache(100);

        cache.set("short", &1u8, Some(1_000));
        cache.set("long", &2u8, Some(10_000));
        clock.advance(1_500);

        assert_eq!(cache.cleanup_expired(), 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get::<u8>("long"), Some(2));
    }

    #[test]
    fn test_memory_usage_counts_live_entries_only() {
        let (mut cache, clock) = test_cache(100);

        cache.set("a", "xxxx", Some(1_000));
        cache.set("b", "yy", Some(10_000));
        assert_eq!(cache.memory_usage(), 6 + 4);

        clock.advance(2_000);
        assert_eq!(cache.memory_usage(), 4);
        assert_eq!(cache.stats().total_entries, 1);
    }

    #[test]
    fn test_memory_ceiling_is_advisory() {
        let clock = ManualClock::new(START);
        let config = CacheConfig {
            max_entries: 100,
            max_memory_bytes: 16,
            ..CacheConfig::default()
        };
        let mut cache = ResponseCache::with_clock(config, Arc::new(clock));

        for i in 0..10 {
            cache.set(format!("key-{}", i), "well past sixteen bytes", None);
        }

        assert_eq!(cache.len(), 10);
        for i in 0..10 {
            assert!(cache.get::<String>(&format!("key-{}", i)).is_some());
        }

        let stats = cache.stats();
        assert_eq!(stats.evictions, 0);
        assert_eq!(stats.total_entries, 10);
        assert!(stats.memory_usage > stats.max_memory_bytes);
        assert!(stats.over_memory_budget());
    }

    #[test]
    fn test_response_time_recorded_on_every_get() {
        let (mut cache, _) = test_cache(100);

        cache.set("k", &1u8, None);
        let _: Option<u8> = cache.get("k");
        let _: Option<u8> = cache.get("missing");

        assert_eq!(cache.stats.response_count, 2);
        assert!(cache.stats().average_response_time >= 0.0);
    }
}
