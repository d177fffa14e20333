//! Cache Module
//!
//! Provides an in-memory response cache with TTL and schema-version expiry,
//! adaptive TTL, score-based eviction and payload compression.

mod adaptive;
mod clock;
mod codec;
mod entry;
mod eviction;
mod stats;
mod store;


// Re-export public types
pub use adaptive::{maybe_extend_ttl, MAX_ADAPTIVE_TTL_MS};
pub use clock::{current_timestamp_ms, Clock, ManualClock, SystemClock};
pub use codec::{rle_decode, rle_encode, CompressionCodec};
pub use entry::{CacheEntry, Payload};
pub use eviction::{eviction_count, eviction_score, select_victims};
pub use stats::{CacheMetrics, CacheStats};
pub use store::ResponseCache;
