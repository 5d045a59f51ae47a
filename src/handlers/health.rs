//! Health check endpoint
//!
//! Provides a simple liveness probe for monitoring and load balancers.
//! Deliberately outside the CORS-gated chat path.

use axum::{Json, http::StatusCode};
use serde::Serialize;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: &'static str,
}

/// Health check handler
///
/// Returns 200 OK whenever the process is serving requests. The gateway
/// holds no mutable state, so there is nothing further to report.
pub async fn handler() -> (StatusCode, Json<HealthResponse>) {
    (StatusCode::OK, Json(HealthResponse { status: "ok" }))
}
