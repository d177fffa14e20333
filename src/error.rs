//! Error types for the response cache and gateway
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Gateway Error Enum ==
/// Unified error type for the cache and the gateway around it.
///
/// `Serialization` and `Decompression` are raised inside the cache and are
/// always absorbed there; callers of `ResponseCache::get`/`set` never see them.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Key or resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Value could not be serialized or deserialized
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Stored payload could not be decompressed
    #[error("Decompression failed: {0}")]
    Decompression(String),

    /// Content API could not be reached
    #[error("Upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),

    /// Content API answered with a non-success status
    #[error("Upstream returned {status} for {endpoint}")]
    UpstreamStatus { status: u16, endpoint: String },
}

// == IntoResponse Implementation ==
impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = match &self {
            GatewayError::NotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::Upstream(e) if e.is_timeout() => StatusCode::GATEWAY_TIMEOUT,
            GatewayError::Upstream(_) => StatusCode::BAD_GATEWAY,
            GatewayError::UpstreamStatus { status, .. } if *status == 404 => StatusCode::NOT_FOUND,
            GatewayError::UpstreamStatus { .. } => StatusCode::BAD_GATEWAY,
            GatewayError::Serialization(_) | GatewayError::Decompression(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the crate.
pub type Result<T> = std::result::Result<T, GatewayError>;
