//! Canonical-request normalization
//!
//! Providers come in two wire shapes: a single flattened text block
//! (Gemini) and structured role turns (OpenAI, DeepSeek). The strategy is
//! selected per provider capability, not globally; for the flattened shape
//! the specific flattening policy is configurable via
//! [`PromptStyle`](crate::config::PromptStyle).

use crate::config::PromptStyle;
use crate::providers::{ChatMessage, Role};
use serde_json::Value;

/// Flatten the conversation according to the configured style
pub fn flatten(messages: &[ChatMessage], style: PromptStyle) -> String {
    match style {
        PromptStyle::Transcript => transcript(messages),
        PromptStyle::SystemUser => system_user(messages),
    }
}

/// Every message as a `ROLE: content` line joined by newlines
///
/// An empty message list flattens to an empty prompt; the provider call
/// still proceeds.
fn transcript(messages: &[ChatMessage]) -> String {
    messages
        .iter()
        .map(|message| format!("{}: {}", message.role.transcript_label(), message.content))
        .collect::<Vec<_>>()
        .join("\n")
}

/// First system message plus first user message, absent roles as empty
fn system_user(messages: &[ChatMessage]) -> String {
    let first_with_role = |role: Role| {
        messages
            .iter()
            .find(|message| message.role == role)
            .map(|message| message.content.as_str())
            .unwrap_or_default()
    };

    let system = first_with_role(Role::System);
    let user = first_with_role(Role::User);

    match (system.is_empty(), user.is_empty()) {
        (true, true) => String::new(),
        (true, false) => user.to_string(),
        (false, true) => system.to_string(),
        (false, false) => format!("{system}\n\n{user}"),
    }
}

/// Structured role turns, passed to the provider near-verbatim
pub fn role_turns(messages: &[ChatMessage]) -> Value {
    // Role serializes lowercase, which is exactly what OpenAI-shaped APIs take.
    serde_json::to_value(messages).unwrap_or_else(|_| Value::Array(Vec::new()))
}
