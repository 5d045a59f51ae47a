//! HTTP request handlers for the Chatgate API

use crate::config::Config;
use crate::cors::OriginPolicy;
use crate::error::{AppError, AppResult};
use crate::providers::{ProviderAdapter, build_adapter};
use std::sync::Arc;
use std::time::Duration;

pub mod chat;
pub mod health;

/// Application state shared across all handlers
///
/// Everything here is immutable after startup: configuration, the compiled
/// origin policy, the resolved provider adapter, the shared HTTP client,
/// and the environment-sourced secret. Fields are Arc'd for cheap cloning
/// across Axum handlers.
#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    policy: Arc<OriginPolicy>,
    adapter: Arc<dyn ProviderAdapter>,
    client: reqwest::Client,
    secret: Option<Arc<str>>,
}

impl AppState {
    /// Create a new AppState from configuration and the provider secret
    ///
    /// The secret is the value of the environment variable named by the
    /// configured provider kind. A missing secret is not fatal here; every
    /// chat request will fail with a `Configuration` error naming the
    /// variable, before any network call.
    pub fn new(config: Arc<Config>, secret: Option<String>) -> AppResult<Self> {
        let policy = Arc::new(OriginPolicy::from_config(&config.cors)?);
        let adapter = build_adapter(&config.provider);

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.server.request_timeout_seconds))
            .build()
            .map_err(|e| AppError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            config,
            policy,
            adapter,
            client,
            secret: secret.map(Arc::from),
        })
    }

    /// Read the provider secret from the process environment
    pub fn secret_from_env(config: &Config) -> Option<String> {
        std::env::var(config.provider.kind.secret_env()).ok()
    }

    /// Get reference to the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get reference to the origin policy
    pub fn policy(&self) -> &OriginPolicy {
        &self.policy
    }

    /// Get reference to the provider adapter
    pub fn adapter(&self) -> &dyn ProviderAdapter {
        self.adapter.as_ref()
    }

    /// Get reference to the shared HTTP client
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Get the provider secret, if the environment supplied one
    pub fn secret(&self) -> Option<&str> {
        self.secret.as_deref()
    }
}
