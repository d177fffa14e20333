//! Upstream Module
//!
//! Client for the content API the cache fronts, and the read-through path
//! that combines it with the response cache.

mod client;

pub use client::{normalize_endpoint, request_key, CachedContentClient, ContentClient, Fetched};
