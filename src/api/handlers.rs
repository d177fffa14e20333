//! API Handlers
//!
//! HTTP request handlers for the caching gateway and its diagnostics surface.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use tracing::info;

use crate::cache::{CacheMetrics, ResponseCache};
use crate::error::{GatewayError, Result};
use crate::models::{ClearResponse, DeleteResponse, HealthResponse, VersionRequest, VersionResponse};
use crate::upstream::{CachedContentClient, ContentClient};

/// Response header reporting whether content came from the cache.
pub const CACHE_STATUS_HEADER: &str = "x-cache";

/// Application state shared across all handlers.
///
/// Holds the single cache instance for the process, wrapped in
/// Arc<RwLock<>>, and the read-through client that shares it.
#[derive(Clone)]
pub struct AppState {
    /// Thread-safe cache store
    pub cache: Arc<RwLock<ResponseCache>>,
    /// Read-through client for the content API
    pub content: CachedContentClient,
}

impl AppState {
    /// Creates a new AppState around the given cache and upstream client.
    pub fn new(cache: ResponseCache, upstream: ContentClient) -> Self {
        let cache = Arc::new(RwLock::new(cache));
        Self {
            content: CachedContentClient::new(cache.clone(), upstream),
            cache,
        }
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: &crate::config::Config) -> Result<Self> {
        let cache = ResponseCache::new(config.cache.clone());
        let upstream = ContentClient::new(
            config.upstream_url.clone(),
            Duration::from_millis(config.upstream_timeout_ms),
        )?;
        Ok(Self::new(cache, upstream))
    }
}

/// Handler for GET /content/*path
///
/// Serves content API responses through the cache.
pub async fn content_handler(
    State(state): State<AppState>,
    Path(path): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Response> {
    let fetched = state.content.fetch::<Value>(&path, &params).await?;
    let cache_status = if fetched.cache_hit { "HIT" } else { "MISS" };

    Ok(([(CACHE_STATUS_HEADER, cache_status)], Json(fetched.value)).into_response())
}

/// Handler for GET /stats
///
/// Returns a snapshot of cache metrics.
pub async fn stats_handler(State(state): State<AppState>) -> Json<CacheMetrics> {
    let cache = state.cache.read().await;
    Json(cache.stats())
}

/// Handler for DELETE /cache/:key
///
/// Deletes one cached entry. Gateway keys start with `/`, so the key must be
/// percent-encoded into a single segment (`/cache/%2Fpages%2Fabout`). A bare
/// `version` segment is taken by `PUT /cache/version` and answers 405.
pub async fn delete_entry_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    let removed = state.cache.write().await.delete(&key);
    if !removed {
        return Err(GatewayError::NotFound(key));
    }

    Ok(Json(DeleteResponse::new(key)))
}

/// Handler for DELETE /cache
///
/// Drops every cached entry. Metrics are kept.
pub async fn clear_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    let mut cache = state.cache.write().await;
    let removed = cache.len();
    cache.clear();

    Json(ClearResponse::new(removed))
}

/// Handler for PUT /cache/version
///
/// Switches the schema version, invalidating everything cached before.
pub async fn version_handler(
    State(state): State<AppState>,
    Json(req): Json<VersionRequest>,
) -> Result<Json<VersionResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(GatewayError::InvalidRequest(error_msg));
    }

    let mut cache = state.cache.write().await;
    let previous = cache.schema_version().to_string();
    cache.set_schema_version(req.version.trim());
    info!(from = %previous, to = %cache.schema_version(), "Schema version bumped via API");

    Ok(Json(VersionResponse::new(previous, cache.schema_version())))
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
