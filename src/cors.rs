//! Browser origin policy
//!
//! Consolidates the per-request CORS decision into a single component:
//! an exact allow-list, an optional preview-deployment pattern, and one of
//! two deny modes (fallback header vs immediate 403). Loaded once at
//! startup, immutable thereafter.

use crate::config::{CorsConfig, DenyMode};
use crate::error::{AppError, AppResult};
use axum::http::{HeaderValue, header};
use axum::response::Response;
use regex::Regex;

/// Header value listing the methods the chat endpoint accepts
const ALLOW_METHODS: &str = "POST, OPTIONS";
/// Header value listing the request headers browsers may send
const ALLOW_HEADERS: &str = "Content-Type, Authorization";

/// Per-request origin decision
///
/// Derived from the `Origin` header on every request; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OriginDecision {
    /// Request proceeds. `header` is the `Access-Control-Allow-Origin`
    /// value to emit, or `None` for a non-browser caller in reject mode.
    Allowed { header: Option<String> },
    /// Request is terminated with 403 naming the rejected origin.
    Rejected { origin: String },
}

/// Origin access-control policy
///
/// Rules are evaluated in order: exact allow-list match, preview-deployment
/// pattern match, then the configured deny mode.
#[derive(Debug, Clone)]
pub struct OriginPolicy {
    allowed_origins: Vec<String>,
    preview_pattern: Option<Regex>,
    mode: DenyMode,
    fallback_origin: Option<String>,
}

impl OriginPolicy {
    /// Build the policy from validated configuration
    pub fn from_config(cors: &CorsConfig) -> AppResult<Self> {
        let preview_pattern = cors
            .preview_origin_pattern
            .as_deref()
            .map(Regex::new)
            .transpose()
            .map_err(|e| {
                AppError::Config(format!("cors.preview_origin_pattern is not a valid regex: {e}"))
            })?;

        Ok(Self {
            allowed_origins: cors.allowed_origins.clone(),
            preview_pattern,
            mode: cors.mode,
            fallback_origin: cors.fallback_origin.clone(),
        })
    }

    /// Decide whether the calling origin is permitted and which
    /// `Access-Control-Allow-Origin` value to emit
    pub fn decide(&self, origin: Option<&str>) -> OriginDecision {
        let Some(origin) = origin else {
            // No Origin header: not a browser. In fallback mode the original
            // deployments still emitted the fixed fallback header.
            return match self.mode {
                DenyMode::Fallback => OriginDecision::Allowed {
                    header: self.fallback_origin.clone(),
                },
                DenyMode::Reject => OriginDecision::Allowed { header: None },
            };
        };

        if self.is_permitted(origin) {
            // Echo verbatim: wildcard is incompatible with credentialed
            // requests and with Vary: Origin cache correctness.
            return OriginDecision::Allowed {
                header: Some(origin.to_string()),
            };
        }

        match self.mode {
            DenyMode::Fallback => OriginDecision::Allowed {
                header: self.fallback_origin.clone(),
            },
            DenyMode::Reject => OriginDecision::Rejected {
                origin: origin.to_string(),
            },
        }
    }

    fn is_permitted(&self, origin: &str) -> bool {
        if self.allowed_origins.iter().any(|allowed| allowed == origin) {
            return true;
        }
        self.preview_pattern
            .as_ref()
            .is_some_and(|pattern| pattern.is_match(origin))
    }

    /// Stamp the CORS headers onto an outgoing response
    ///
    /// `Vary: Origin` is always set because the allow-origin value depends
    /// on the request's origin; shared caches must not serve one caller's
    /// CORS header to another.
    pub fn stamp(&self, mut response: Response, decision: &OriginDecision) -> Response {
        let headers = response.headers_mut();

        if let OriginDecision::Allowed { header: Some(value) } = decision
            && let Ok(value) = HeaderValue::from_str(value)
        {
            headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, value);
        }

        headers.insert(header::VARY, HeaderValue::from_static("Origin"));
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOW_METHODS),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOW_HEADERS),
        );

        response
    }
}
