//! OpenAI adapter
//!
//! The chat completions endpoint takes structured role turns near-verbatim
//! and authenticates with a bearer token.

use crate::providers::{ChatRequest, EMPTY_REPLY, ProviderAdapter, prompt, text_at};
use async_trait::async_trait;
use serde_json::{Value, json};

const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Adapter for the OpenAI chat completions API
#[derive(Debug, Clone)]
pub struct OpenAiAdapter {
    base_url: String,
}

impl OpenAiAdapter {
    /// Create an adapter, optionally overriding the endpoint base URL
    pub fn new(base_url: Option<String>) -> Self {
        Self {
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        }
    }
}

#[async_trait]
impl ProviderAdapter for OpenAiAdapter {
    fn name(&self) -> &'static str {
        "OpenAI"
    }

    fn secret_env(&self) -> &'static str {
        "OPENAI_API_KEY"
    }

    fn default_model(&self) -> &'static str {
        "gpt-4o-mini"
    }

    fn request_url(&self, _model: &str, _secret: &str) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }

    fn auth_header(&self, secret: &str) -> Option<String> {
        Some(format!("Bearer {secret}"))
    }

    fn build_request(&self, request: &ChatRequest, model: &str) -> Value {
        let mut body = json!({
            "model": model,
            "messages": prompt::role_turns(&request.messages),
        });
        if let Some(temperature) = request.temperature {
            body["temperature"] = json!(temperature);
        }
        body
    }

    fn extract_reply(&self, body: &Value) -> String {
        extract_choice_content(body)
    }
}

/// Reply extraction for OpenAI-shaped responses, shared with DeepSeek
///
/// Tiers: `choices[0].message.content` as a string, then the concatenation
/// of text-bearing segments when `content` arrives as a parts array, then
/// the placeholder.
pub(crate) fn extract_choice_content(body: &Value) -> String {
    if let Some(text) = text_at(body, "/choices/0/message/content") {
        return text.to_string();
    }

    let joined: String = body
        .pointer("/choices/0/message/content")
        .and_then(Value::as_array)
        .map(|segments| {
            segments
                .iter()
                .filter_map(|segment| segment.get("text").and_then(Value::as_str))
                .filter(|text| !text.is_empty())
                .collect()
        })
        .unwrap_or_default();

    if joined.is_empty() {
        EMPTY_REPLY.to_string()
    } else {
        joined
    }
}
