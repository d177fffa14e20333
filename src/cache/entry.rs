//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL, schema
//! version and access bookkeeping.

use crate::cache::codec::CompressionCodec;
use crate::error::Result;

// == Stored Payload ==
/// The stored representation of a serialized value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Serialized JSON text, stored as-is.
    Plain(String),
    /// Serialized JSON text after compression.
    Compressed {
        codec: CompressionCodec,
        bytes: Vec<u8>,
    },
}

impl Payload {
    /// Size in bytes of the stored form.
    pub fn size_bytes(&self) -> usize {
        match self {
            Payload::Plain(text) => text.len(),
            Payload::Compressed { bytes, .. } => bytes.len(),
        }
    }

    /// Returns true if the payload is held in compressed form.
    pub fn is_compressed(&self) -> bool {
        matches!(self, Payload::Compressed { .. })
    }

    /// Restores the serialized JSON text.
    pub fn to_text(&self) -> Result<String> {
        match self {
            Payload::Plain(text) => Ok(text.clone()),
            Payload::Compressed { codec, bytes } => codec.decompress(bytes),
        }
    }
}

// == Cache Entry ==
/// Represents a single cached response with its metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The stored (possibly compressed) payload
    pub payload: Payload,
    /// Creation timestamp (Unix milliseconds)
    pub stored_at: u64,
    /// Lifetime in milliseconds after `stored_at`; may grow on hot reads
    pub ttl_ms: u64,
    /// Cache-wide schema version active when the entry was written
    pub schema_version: String,
    /// Number of successful reads since creation
    pub access_count: u64,
    /// Timestamp of the last successful read (Unix milliseconds)
    pub last_accessed_at: u64,
    /// Size of the stored payload in bytes
    pub size_bytes: usize,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a fresh entry stored at `now`.
    pub fn new(payload: Payload, now: u64, ttl_ms: u64, schema_version: impl Into<String>) -> Self {
        let size_bytes = payload.size_bytes();
        Self {
            payload,
            stored_at: now,
            ttl_ms,
            schema_version: schema_version.into(),
            access_count: 0,
            last_accessed_at: now,
            size_bytes,
        }
    }

    // == Is Expired ==
    /// Checks if the entry's TTL has fully elapsed at `now`.
    ///
    /// Boundary condition: the entry is expired once `now >= stored_at + ttl`.
    pub fn is_expired(&self, now: u64) -> bool {
        now.saturating_sub(self.stored_at) >= self.ttl_ms
    }

    // == Is Stale ==
    /// Checks whether the entry is logically absent: expired by TTL or
    /// written under a different schema version.
    pub fn is_stale(&self, now: u64, current_version: &str) -> bool {
        self.is_expired(now) || self.schema_version != current_version
    }

    // == Age ==
    /// Milliseconds since the entry was stored.
    pub fn age_ms(&self, now: u64) -> u64 {
        now.saturating_sub(self.stored_at)
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds (0 once expired).
    pub fn ttl_remaining_ms(&self, now: u64) -> u64 {
        self.stored_at.saturating_add(self.ttl_ms).saturating_sub(now)
    }

    // == Record Access ==
    /// Updates access bookkeeping for a successful read.
    pub fn record_access(&mut self, now: u64) {
        self.access_count += 1;
        self.last_accessed_at = now;
    }
}
