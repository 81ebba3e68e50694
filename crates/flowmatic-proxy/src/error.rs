//! Error types for the backend proxy.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, ProxyError>;

/// Errors that can occur while forwarding a request.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    /// No backend base URL could be resolved for this request.
    #[error("Backend URL is not configured: {0}")]
    MissingBackend(String),

    /// The allow-list contains something that is not a header name.
    #[error("Invalid header name: {0}")]
    InvalidHeader(String),

    /// The outbound fetch or the body read failed.
    #[error("Failed to reach backend: {0}")]
    Network(String),

    /// The relayed response could not be assembled.
    #[error("Failed to build response: {0}")]
    Response(String),
}

impl From<reqwest::Error> for ProxyError {
    fn from(e: reqwest::Error) -> Self {
        ProxyError::Network(e.to_string())
    }
}

/// Every forwarding failure surfaces to the caller as a 502 with `{ "error": "..." }`.
impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.to_string() });
        (StatusCode::BAD_GATEWAY, Json(body)).into_response()
    }
}
