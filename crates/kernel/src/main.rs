//! Struttura kernel.
//!
//! HTTP server over the in-memory site structures.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::Router;
use tower_http::trace::TraceLayer;
use tower_sessions::{MemoryStore, SessionManagerLayer};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use struttura_kernel::config::Config;
use struttura_kernel::routes;
use struttura_kernel::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_tracing();

    info!("Starting struttura kernel");

    let config = Config::from_env().context("failed to load configuration")?;
    info!(app = %config.app_name, port = config.port, "Configuration loaded");

    // Connects, runs the full structure fetch sequence, loads views.
    let port = config.port;
    let state = AppState::new(config)
        .await
        .context("failed to initialize application state")?;

    let session_layer = SessionManagerLayer::new(MemoryStore::default());

    let app = Router::new()
        .merge(routes::health::router())
        .merge(routes::front::router())
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("failed to bind to address")?;

    info!(%addr, "Server listening");

    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("struttura_kernel=debug,tower_http=debug,info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
