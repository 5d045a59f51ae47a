//! DeepSeek adapter
//!
//! OpenAI-shaped wire format with a bearer token; only the host and model
//! naming differ.

use crate::providers::openai::extract_choice_content;
use crate::providers::{ChatRequest, ProviderAdapter, prompt};
use async_trait::async_trait;
use serde_json::{Value, json};

const DEFAULT_BASE_URL: &str = "https://api.deepseek.com";

/// Adapter for the DeepSeek chat completions API
#[derive(Debug, Clone)]
pub struct DeepSeekAdapter {
    base_url: String,
}

impl DeepSeekAdapter {
    /// Create an adapter, optionally overriding the endpoint base URL
    pub fn new(base_url: Option<String>) -> Self {
        Self {
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        }
    }
}

#[async_trait]
impl ProviderAdapter for DeepSeekAdapter {
    fn name(&self) -> &'static str {
        "DeepSeek"
    }

    fn secret_env(&self) -> &'static str {
        "DEEPSEEK_API_KEY"
    }

    fn default_model(&self) -> &'static str {
        "deepseek-chat"
    }

    fn request_url(&self, _model: &str, _secret: &str) -> String {
        format!("{}/chat/completions", self.base_url)
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
