//! Error type of the HTTP layer
//!
//! Each variant maps to one status code and renders as
//! `{"error": <message>, "status": <code>}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::common::errors::MarketError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Malformed registration or query (400)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Password mismatch (401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Anything else (500)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<MarketError> for AppError {
    fn from(err: MarketError) -> Self {
        match err {
            MarketError::Authorization(name) => {
                AppError::Unauthorized(format!("seller {} is registered with another password", name))
            }
            MarketError::InvalidUrl(e) => AppError::BadRequest(format!("invalid url: {}", e)),
            MarketError::Validation(e) => AppError::BadRequest(e.to_string()),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = axum::Json(json!({
            "error": message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
