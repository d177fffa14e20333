//! Configuration Module
//!
//! Handles loading cache and gateway configuration from environment variables.

use std::env;
use std::str::FromStr;

use crate::cache::CompressionCodec;

// == Cache Config ==
/// Tuning parameters for a `ResponseCache`, fixed at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheConfig {
    /// Maximum number of entries the cache can hold
    pub max_entries: usize,
    /// TTL in milliseconds for entries written without an explicit TTL
    pub default_ttl_ms: u64,
    /// Version tag stamped on every entry; changing it invalidates the cache
    pub schema_version: String,
    /// Memory ceiling in bytes, reported in metrics but not enforced
    pub max_memory_bytes: u64,
    /// Serialized size above which payloads are compressed
    pub compression_threshold_bytes: usize,
    /// Whether hot entries get their TTL extended on read
    pub adaptive_ttl_enabled: bool,
    /// Codec used for payloads above the threshold
    pub codec: CompressionCodec,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 200,
            default_ttl_ms: 5 * 60 * 1000,
            schema_version: "1".to_string(),
            max_memory_bytes: 50 * 1024 * 1024,
            compression_threshold_bytes: 1024,
            adaptive_ttl_enabled: true,
            codec: CompressionCodec::Lz4,
        }
    }
}

impl CacheConfig {
    /// Loads cache settings from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_MAX_ENTRIES` - Maximum cache entries (default: 200)
    /// - `CACHE_DEFAULT_TTL_MS` - Default TTL in milliseconds (default: 300000)
    /// - `CACHE_SCHEMA_VERSION` - Schema version tag (default: "1")
    /// - `CACHE_MAX_MEMORY_BYTES` - Advisory memory ceiling (default: 50 MiB)
    /// - `CACHE_COMPRESSION_THRESHOLD_BYTES` - Compression threshold (default: 1024)
    /// - `CACHE_ADAPTIVE_TTL` - Enable adaptive TTL (default: true)
    /// - `CACHE_CODEC` - `lz4` or `rle` (default: lz4)
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Loads cache settings through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            max_entries: parse_or(&lookup, "CACHE_MAX_ENTRIES", defaults.max_entries),
            default_ttl_ms: parse_or(&lookup, "CACHE_DEFAULT_TTL_MS", defaults.default_ttl_ms),
            schema_version: lookup("CACHE_SCHEMA_VERSION")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.schema_version),
            max_memory_bytes: parse_or(&lookup, "CACHE_MAX_MEMORY_BYTES", defaults.max_memory_bytes),
            compression_threshold_bytes: parse_or(
                &lookup,
                "CACHE_COMPRESSION_THRESHOLD_BYTES",
                defaults.compression_threshold_bytes,
            ),
            adaptive_ttl_enabled: lookup("CACHE_ADAPTIVE_TTL")
                .and_then(|v| parse_flag(&v))
                .unwrap_or(defaults.adaptive_ttl_enabled),
            codec: parse_or(&lookup, "CACHE_CODEC", defaults.codec),
        }
    }
}

// == Gateway Config ==
/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Response cache settings
    pub cache: CacheConfig,
    /// HTTP server port
    pub server_port: u16,
    /// Background cleanup task interval in seconds
    pub cleanup_interval: u64,
    /// Base URL of the content API fronted by the cache
    pub upstream_url: String,
    /// Timeout for upstream requests in milliseconds
    pub upstream_timeout_ms: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Cleanup frequency in seconds (default: 60)
    /// - `UPSTREAM_URL` - Content API base URL (default: http://127.0.0.1:8080)
    /// - `UPSTREAM_TIMEOUT_MS` - Upstream request timeout (default: 10000)
    /// - plus every `CACHE_*` variable read by [`CacheConfig::from_env`]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Loads configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            cache: CacheConfig::from_lookup(&lookup),
            server_port: parse_or(&lookup, "SERVER_PORT", defaults.server_port),
            cleanup_interval: parse_or(&lookup, "CLEANUP_INTERVAL", defaults.cleanup_interval),
            upstream_url: lookup("UPSTREAM_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.upstream_url),
            upstream_timeout_ms: parse_or(
                &lookup,
                "UPSTREAM_TIMEOUT_MS",
                defaults.upstream_timeout_ms,
            ),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache: CacheConfig::default(),
            server_port: 3000,
            cleanup_interval: 60,
            upstream_url: "http://127.0.0.1:8080".to_string(),
            upstream_timeout_ms: 10_000,
        }
    }
}

// == Parsing Helpers ==
fn parse_or<F, T>(lookup: &F, name: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    lookup(name)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
