//! Gemini adapter
//!
//! Gemini's generateContent endpoint takes a single flattened text block
//! and authenticates with the API key as a `?key=` query parameter.

use crate::config::PromptStyle;
use crate::providers::{ChatRequest, EMPTY_REPLY, ProviderAdapter, prompt, text_at};
use async_trait::async_trait;
use serde_json::{Value, json};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Adapter for the Google Gemini generateContent API
#[derive(Debug, Clone)]
pub struct GeminiAdapter {
    base_url: String,
    prompt_style: PromptStyle,
}

impl GeminiAdapter {
    /// Create an adapter, optionally overriding the endpoint base URL
    pub fn new(base_url: Option<String>, prompt_style: PromptStyle) -> Self {
        Self {
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            prompt_style,
        }
    }
}

#[async_trait]
impl ProviderAdapter for GeminiAdapter {
    fn name(&self) -> &'static str {
        "Gemini"
    }

    fn secret_env(&self) -> &'static str {
        "GEMINI_API_KEY"
    }

    fn default_model(&self) -> &'static str {
        "gemini-1.5-flash"
    }

    fn request_url(&self, model: &str, secret: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, model, secret
        )
    }

    fn auth_header(&self, _secret: &str) -> Option<String> {
        // The key travels in the URL, not a header
        None
    }

    fn build_request(&self, request: &ChatRequest, _model: &str) -> Value {
        let prompt_text = prompt::flatten(&request.messages, self.prompt_style);

        let mut body = json!({
            "contents": [{
                "parts": [{ "text": prompt_text }]
            }]
        });
        if let Some(temperature) = request.temperature {
            body["generationConfig"] = json!({ "temperature": temperature });
        }
        body
    }

    fn extract_reply(&self, body: &Value) -> String {
        // Primary path: first part of the first candidate
        if let Some(text) = text_at(body, "/candidates/0/content/parts/0/text") {
            return text.to_string();
        }

        // Fallback: concatenate every text-bearing part of the first
        // candidate, skipping empty and absent segments
        let joined: String = body
            .pointer("/candidates/0/content/parts")
            .and_then(Value::as_array)
            .map(|parts| {
                parts
                    .iter()
                    .filter_map(|part| part.get("text").and_then(Value::as_str))
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
}
