//! Chatgate - provider-normalization gateway for browser chat front ends
//!
//! This library exposes a single chat endpoint that applies a CORS origin
//! policy, translates a canonical chat request into the wire format of one
//! configured LLM provider (Gemini, OpenAI, DeepSeek), and normalizes the
//! provider's reply back into one canonical envelope.

pub mod cli;
pub mod config;
pub mod cors;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod providers;
pub mod telemetry;
