//! Error types for the caching engine and its diagnostics surface
//!
//! Provides unified error handling using thiserror. A cache miss is never an
//! error, and fetch failures from load-through calls keep the caller's own type.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the caching engine.
#[derive(Error, Debug)]
pub enum CacheError {
    /// No cache is registered under the requested name
    #[error("Unknown cache: {0}")]
    UnknownCache(String),

    /// Configuration value is missing its invariants
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::UnknownCache(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidConfig(_) => StatusCode::BAD_REQUEST,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the caching engine.
pub type Result<T> = std::result::Result<T, CacheError>;
