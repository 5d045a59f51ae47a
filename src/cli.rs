//! Command-line interface for Chatgate
//!
//! Provides argument parsing and subcommand handling for the Chatgate binary.

use clap::{Parser, Subcommand};

/// Provider-normalization gateway for browser chat front ends
#[derive(Parser)]
#[command(name = "chatgate")]
#[command(version)]
#[command(about = "Provider-normalization gateway for browser chat front ends")]
#[command(
    long_about = "Chatgate fronts a browser chat widget with a single canonical API, \
    applies an origin allow-list with preview-deployment support, and forwards requests \
    to one configured LLM provider (Gemini, OpenAI, or DeepSeek)."
)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml", global = true)]
    pub config: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Generate a template configuration file
    Config {
        /// Output file path (prints to stdout if not specified)
        #[arg(short, long)]
        output: Option<String>,
    },
}

/// Generate template configuration content
pub fn generate_config_template() -> &'static str {
    r#"# Chatgate Configuration
# ======================
#
# This file configures the HTTP server, the browser origin policy, and the
# upstream LLM provider for Chatgate.
#
# Provider API keys are NOT configured here. They are read from the
# environment variable matching the configured provider:
#   gemini   -> GEMINI_API_KEY
#   openai   -> OPENAI_API_KEY
#   deepseek -> DEEPSEEK_API_KEY

# ─────────────────────────────────────────────────────────────────────────────
# SERVER CONFIGURATION
# ─────────────────────────────────────────────────────────────────────────────

[server]
# IP address to bind to (0.0.0.0 for all interfaces, 127.0.0.1 for localhost only)
host = "0.0.0.0"

# Port to listen on
port = 3000

# Outbound provider call timeout in seconds
request_timeout_seconds = 30

# ─────────────────────────────────────────────────────────────────────────────
# ORIGIN POLICY (CORS)
# ─────────────────────────────────────────────────────────────────────────────
#
# Origins are matched in order: exact allow-list, then the preview pattern.
# A permitted origin is echoed verbatim in Access-Control-Allow-Origin and
# every response carries Vary: Origin.

[cors]
# Fully-qualified origins allowed exactly as written
allowed_origins = [
    "https://ericliu-eng.github.io",
    "https://our-love-rosy.vercel.app",
]

# Optional regex for preview-deployment origins (anchor it!)
preview_origin_pattern = "^https://our-love-[a-z0-9-]+\\.vercel\\.app$"

# What a non-permitted origin receives:
#   - "fallback": emit fallback_origin as the allow-origin header and let
#     the browser enforce the mismatch (degrade gracefully)
#   - "reject": respond 403 immediately, naming the rejected origin
mode = "fallback"

# Required when mode = "fallback"
fallback_origin = "https://ericliu-eng.github.io"

# ─────────────────────────────────────────────────────────────────────────────
# PROVIDER
# ─────────────────────────────────────────────────────────────────────────────

[provider]
# Which upstream serves this deployment: "gemini", "openai", or "deepseek"
kind = "gemini"

# Optional model override. Defaults per provider:
#   gemini -> gemini-1.5-flash, openai -> gpt-4o-mini, deepseek -> deepseek-chat
# model = "gemini-1.5-flash"

# Optional endpoint base URL override (regional proxies, testing)
# base_url = "https://generativelanguage.googleapis.com"

# Prompt flattening for providers taking a single text block (gemini):
#   - "transcript": every message as a "ROLE: content" line
#   - "system-user": first system message plus first user message only
prompt_style = "transcript"

# ─────────────────────────────────────────────────────────────────────────────
# OBSERVABILITY
# ─────────────────────────────────────────────────────────────────────────────

[observability]
# Log level: "trace", "debug", "info", "warn", "error"
log_level = "info"
"#
}
