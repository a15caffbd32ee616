mod chat;
mod config;
mod errors;
mod llm_client;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::chat::pipeline::ChatPipeline;
use crate::config::Config;
use crate::llm_client::OpenAiClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Travel Assistant v{}", env!("CARGO_PKG_VERSION"));

    let completer = OpenAiClient::new(config.openai_api_key.clone(), config.completion_settings())?;
    if config.openai_api_key.is_none() {
        warn!("OPENAI_API_KEY is not set; chat requests will fail until it is provided");
    }
    info!("Completion client initialized (model: {})", completer.model());

    let pipeline = ChatPipeline::from_config(&config);
    info!(
        "Chat pipeline ready (history limit: {:?}, call-to-action format: {:?})",
        config.max_history_turns, config.cta_format
    );

    let state = AppState {
        pipeline: Arc::new(pipeline),
        completer: Arc::new(completer),
    };

    let app = build_router(state).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
