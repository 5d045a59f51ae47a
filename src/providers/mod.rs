//! Provider adapter layer
//!
//! One adapter per upstream LLM API. Each adapter owns its endpoint URL,
//! auth style, request body shape, and reply extraction rules; the gateway
//! only ever talks to the [`ProviderAdapter`] trait. Selection is a pure
//! mapping from configuration to a concrete adapter, resolved once at
//! startup.

use crate::config::ProviderConfig;
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

pub mod deepseek;
pub mod gemini;
pub mod openai;
pub mod prompt;

pub use deepseek::DeepSeekAdapter;
pub use gemini::GeminiAdapter;
pub use openai::OpenAiAdapter;

/// Placeholder emitted when a provider returns a structurally valid response
/// that carries no usable text. The caller dereferences
/// `choices[0].message.content` unconditionally, so it must never be absent.
pub const EMPTY_REPLY: &str = "(empty reply)";

/// Message author role
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    /// Label used when flattening a transcript into a single text block
    pub fn transcript_label(self) -> &'static str {
        match self {
            // The front end ships instructions as a system message; the
            // flattened prompt keeps the original deployments' labeling.
            Self::System => "Instructions",
            Self::User => "USER",
            Self::Assistant => "ASSISTANT",
        }
    }
}

/// One turn of caller-supplied conversation
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

/// Canonical chat request accepted by the gateway
///
/// `messages` is insertion-ordered conversation history and may be empty;
/// an empty prompt is not an error.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    pub model: Option<String>,
    pub temperature: Option<f64>,
}

/// A completed HTTP exchange with a provider, success or not
///
/// Non-2xx statuses are data, not errors: the upstream body carries the
/// diagnostic detail (invalid key, quota, unsupported region) the caller
/// needs, and is passed through verbatim.
#[derive(Debug, Clone)]
pub struct RawProviderResponse {
    pub status: u16,
    pub body: Value,
}

impl RawProviderResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Canonical success envelope returned to the caller
///
/// Always `choices[0].message.content`-compatible for the existing front
/// ends; `raw` round-trips the provider payload unmodified for caller-side
/// debugging.
#[derive(Debug, Clone, Serialize)]
pub struct CanonicalReply {
    pub choices: Vec<ReplyChoice>,
    pub raw: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReplyChoice {
    pub message: ReplyMessage,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReplyMessage {
    pub content: String,
}

impl CanonicalReply {
    pub fn new(content: String, raw: Value) -> Self {
        Self {
            choices: vec![ReplyChoice {
                message: ReplyMessage { content },
            }],
            raw,
        }
    }
}

/// Supported upstream providers
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Gemini,
    OpenAi,
    DeepSeek,
}

impl ProviderKind {
    /// Environment variable holding this provider's API key
    pub fn secret_env(self) -> &'static str {
        match self {
            Self::Gemini => "GEMINI_API_KEY",
            Self::OpenAi => "OPENAI_API_KEY",
            Self::DeepSeek => "DEEPSEEK_API_KEY",
        }
    }
}

/// Capability set every provider variant implements
///
/// The gateway calls `build_request` before the network, `send` exactly
/// once per request, and `extract_reply` on a successful exchange. No
/// retry, no adapter-level timeout beyond the shared client default.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Display name used in error envelopes ("Gemini API error")
    fn name(&self) -> &'static str;

    /// Environment variable carrying the API key
    fn secret_env(&self) -> &'static str;

    /// Model used when neither the request nor the config names one
    fn default_model(&self) -> &'static str;

    /// Full request URL. Gemini embeds the secret as a query parameter;
    /// bearer-token providers return a secret-free URL.
    fn request_url(&self, model: &str, secret: &str) -> String;

    /// `Authorization` header value, for bearer-token providers
    fn auth_header(&self, secret: &str) -> Option<String>;

    /// Map the canonical request onto this provider's wire body
    fn build_request(&self, request: &ChatRequest, model: &str) -> Value;

    /// Resolve the assistant's reply text from a successful response body,
    /// falling through the provider's extraction tiers; never empty.
    fn extract_reply(&self, body: &Value) -> String;

    /// Issue the single outbound call for this request
    ///
    /// A completed exchange always yields `Ok`, whatever the status code.
    /// Only transport failures and non-JSON response bodies are errors.
    async fn send(
        &self,
        client: &reqwest::Client,
        model: &str,
        secret: &str,
        body: &Value,
    ) -> AppResult<RawProviderResponse> {
        let url = self.request_url(model, secret);
        let mut request = client.post(&url).json(body);
        if let Some(auth) = self.auth_header(secret) {
            request = request.header(reqwest::header::AUTHORIZATION, auth);
        }

        let response = request.send().await.map_err(|e| AppError::Upstream {
            provider: self.name().to_string(),
            reason: e.to_string(),
        })?;

        let status = response.status().as_u16();
        let body: Value = response.json().await.map_err(|e| AppError::Upstream {
            provider: self.name().to_string(),
            reason: format!("response was not valid JSON: {e}"),
        })?;

        Ok(RawProviderResponse { status, body })
    }
}

/// Resolve the configured provider kind to its concrete adapter
pub fn build_adapter(config: &ProviderConfig) -> Arc<dyn ProviderAdapter> {
    match config.kind {
        ProviderKind::Gemini => Arc::new(GeminiAdapter::new(
            config.base_url.clone(),
            config.prompt_style,
        )),
        ProviderKind::OpenAi => Arc::new(OpenAiAdapter::new(config.base_url.clone())),
        ProviderKind::DeepSeek => Arc::new(DeepSeekAdapter::new(config.base_url.clone())),
    }
}

/// Shared extraction helper: first non-empty string at a JSON pointer path
pub(crate) fn text_at<'a>(body: &'a Value, pointer: &str) -> Option<&'a str> {
    body.pointer(pointer)
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
}
