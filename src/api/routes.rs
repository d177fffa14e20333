//! API Routes
//!
//! Configures the Axum router with the gateway and diagnostics endpoints.

use axum::{
    routing::{delete, get, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    clear_handler, content_handler, delete_entry_handler, health_handler, stats_handler,
    version_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /content/*path` - Content API response, served through the cache
/// - `GET /stats` - Cache metrics snapshot
/// - `DELETE /cache/:key` - Drop one cached entry (key percent-encoded)
/// - `DELETE /cache` - Drop every cached entry
/// - `PUT /cache/version` - Bump the schema version
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router with all endpoints
    Router::new()
        .route("/content/*path", get(content_handler))
        .route("/stats", get(stats_handler))
        .route("/cache", delete(clear_handler))
        .route("/cache/version", put(version_handler))
        .route("/cache/:key", delete(delete_entry_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
