mod ai;
mod config;
mod db;
mod errors;
mod features;
mod models;
mod routes;
mod state;

use std::sync::Arc;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::ai::client::GeminiClient;
use crate::ai::AiService;
use crate::config::Config;
use crate::db::create_pool;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Compass API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url, config.db_max_connections).await?;

    // Initialize the AI orchestration service (rate limiter + model pool +
    // Gemini client live inside it, shared across all requests)
    let settings = config.ai_settings();
    let backend = Arc::new(GeminiClient::new(config.gemini_api_key.clone()));
    let ai = Arc::new(AiService::new(backend, settings));
    info!(
        "AI service initialized (model: {}, {} req/min, {} attempts)",
        config.gemini_model, config.ai_requests_per_minute, config.ai_max_attempts
    );

    // Build app state
    let state = AppState { db, ai };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
