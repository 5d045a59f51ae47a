//! Chatgate HTTP server
//!
//! Starts an Axum web server exposing the CORS-gated chat gateway and a
//! health probe.

use axum::{
    Router, middleware,
    routing::{any, get},
};
use chatgate::{
    cli::{Cli, Command},
    config::Config,
    handlers::{self, AppState},
    middleware::request_id_middleware,
    telemetry,
};
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Subcommands run before any server setup
    if let Some(Command::Config { output }) = &cli.command {
        let template = chatgate::cli::generate_config_template();
        match output {
            Some(path) => {
                std::fs::write(path, template)?;
                println!("Wrote configuration template to {path}");
            }
            None => print!("{template}"),
        }
        return Ok(());
    }

    // Load configuration
    let config = Config::from_file(&cli.config)?;

    // Initialize telemetry
    telemetry::init(&config.observability.log_level);

    tracing::info!(
        "Starting Chatgate server on {}:{}",
        config.server.host,
        config.server.port
    );

    // Resolve the provider secret from the environment. Absence is reported
    // per-request as a configuration error, not a startup failure.
    let secret = AppState::secret_from_env(&config);
    if secret.is_none() {
        tracing::warn!(
            "{} is not set; chat requests will fail until it is provided",
            config.provider.kind.secret_env()
        );
    }

    let host = config.server.host.clone();
    let port = config.server.port;
    let provider = config.provider.kind;

    // Build router
    let state = AppState::new(Arc::new(config), secret)?;
    let app = Router::new()
        .route("/api/chat", any(handlers::chat::handler))
        .route("/health", get(handlers::health::handler))
        .with_state(state)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http());

    // Create socket address
    let addr = SocketAddr::from((
        host.parse::<std::net::IpAddr>()
            .unwrap_or_else(|_| std::net::IpAddr::from([0, 0, 0, 0])),
        port,
    ));

    tracing::info!("Listening on {}", addr);
    tracing::info!(provider = ?provider, "Chat endpoint available at http://{}/api/chat", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
