//! Error types for Chatgate
//!
//! All errors implement `IntoResponse` for Axum handlers. Response bodies
//! always carry a stable `error` field and, where available, `details`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Main error type for the application
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("CORS blocked for origin {origin}")]
    CorsRejected { origin: String },

    #[error("Method Not Allowed")]
    MethodNotAllowed,

    #[error("Missing {var}")]
    MissingSecret { var: String },

    #[error("Invalid request body: {details}")]
    BadRequest { details: String },

    #[error("Upstream call to {provider} failed: {reason}")]
    Upstream { provider: String, reason: String },
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::Config(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                serde_json::json!({ "error": msg }),
            ),
            Self::CorsRejected { origin } => (
                StatusCode::FORBIDDEN,
                serde_json::json!({ "error": "CORS blocked", "origin": origin }),
            ),
            Self::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                serde_json::json!({ "error": "Method Not Allowed" }),
            ),
            Self::MissingSecret { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                serde_json::json!({ "error": self.to_string() }),
            ),
            Self::BadRequest { details } => (
                StatusCode::BAD_REQUEST,
                serde_json::json!({ "error": "Invalid request body", "details": details }),
            ),
            Self::Upstream { .. } => (
                StatusCode::BAD_GATEWAY,
                serde_json::json!({ "error": self.to_string() }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

/// Convenience type alias for Results
pub type AppResult<T> = Result<T, AppError>;
