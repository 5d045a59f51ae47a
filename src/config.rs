//! Configuration management for Chatgate
//!
//! Parses TOML configuration files and provides typed access to settings.
//! Provider secrets are deliberately NOT part of the file: they come from
//! the environment variable named by the configured provider kind.

use crate::error::{AppError, AppResult};
use crate::providers::ProviderKind;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub server: ServerConfig,
    pub cors: CorsConfig,
    pub provider: ProviderConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

fn default_request_timeout() -> u64 {
    30
}

/// Browser origin policy configuration
///
/// The allow-list and preview pattern are loaded once and treated as
/// immutable process-wide state. `mode` selects what a denied origin gets:
/// a fixed fallback `Access-Control-Allow-Origin` header, or an immediate 403.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CorsConfig {
    /// Fully-qualified origins allowed verbatim
    #[serde(default)]
    pub allowed_origins: Vec<String>,
    /// Optional regex matching preview-deployment origins
    /// (e.g. `^https://myapp-[a-z0-9-]+\.vercel\.app$`)
    pub preview_origin_pattern: Option<String>,
    #[serde(default)]
    pub mode: DenyMode,
    /// Origin header emitted for denied/absent origins in `fallback` mode
    pub fallback_origin: Option<String>,
}

/// What a non-permitted origin receives
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DenyMode {
    /// Degrade gracefully: emit the configured fallback origin header and
    /// let the browser enforce the mismatch
    #[default]
    Fallback,
    /// Return 403 immediately with a diagnostic body naming the origin
    Reject,
}

/// Provider selection configuration
///
/// Exactly one provider serves a deployment. The kind is a pure mapping to
/// a concrete adapter, resolved once at startup.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    /// Model name override; falls back to the adapter default when absent
    pub model: Option<String>,
    /// Endpoint base URL override (tests, regional proxies)
    pub base_url: Option<String>,
    /// Prompt flattening policy for providers taking a single text block
    #[serde(default)]
    pub prompt_style: PromptStyle,
}

/// How a message sequence is flattened into a single prompt text
///
/// Only consulted by adapters whose wire format takes one text block
/// (Gemini). Providers taking structured role turns ignore it.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum PromptStyle {
    /// Every message as a `ROLE: content` line, joined by newlines
    #[default]
    Transcript,
    /// First system message plus first user message only
    SystemUser,
}

/// Observability configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from a TOML file and validate it
    pub fn from_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| {
            AppError::Config(format!("failed to parse {}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate cross-field invariants that serde cannot express
    pub fn validate(&self) -> AppResult<()> {
        if self.server.port == 0 {
            return Err(AppError::Config("server.port must be non-zero".to_string()));
        }

        if self.cors.mode == DenyMode::Fallback && self.cors.fallback_origin.is_none() {
            return Err(AppError::Config(
                "cors.fallback_origin is required when cors.mode = \"fallback\"".to_string(),
            ));
        }

        if let Some(pattern) = &self.cors.preview_origin_pattern {
            regex::Regex::new(pattern).map_err(|e| {
                AppError::Config(format!("cors.preview_origin_pattern is not a valid regex: {e}"))
            })?;
        }

        Ok(())
    }
}
