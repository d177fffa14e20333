//! API Module
//!
//! HTTP handlers and routing for the caching gateway.
//!
//! # Endpoints
//! - `GET /content/*path` - Read-through proxy to the content API
//! - `GET /stats` - Cache metrics for diagnostics panels
//! - `DELETE /cache/:key` - Delete a cached entry
//! - `DELETE /cache` - Clear the cache
//! - `PUT /cache/version` - Bump the schema version
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
