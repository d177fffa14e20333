//! Response Cache - a bounded response cache and caching gateway
//!
//! Fronts a content API with an in-memory cache that expires entries by TTL
//! and schema version, extends the TTL of hot entries, evicts by a
//! frequency/recency/size score and compresses large payloads.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;
pub mod upstream;

pub use api::AppState;
pub use cache::{CacheMetrics, ResponseCache};
pub use config::{CacheConfig, Config};
pub use error::GatewayError;
pub use tasks::spawn_cleanup_task;
