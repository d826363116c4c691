mod config;
mod dispatch;
mod errors;
mod export;
mod models;
mod notify;
mod preview;
mod routes;
mod scheduler;
mod session;
mod state;
mod wizard;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::export::TextExporter;
use crate::routes::build_router;
use crate::state::{AppState, SessionStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (malformed values abort startup)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume Wizard v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Timings: fade {}ms, save {}ms, toast ttl {}ms, session idle ttl {}s; default template {}",
        config.transition_fade_ms,
        config.save_latency_ms,
        config.toast_ttl_ms,
        config.session_idle_ttl_secs,
        config.default_template
    );

    // Exporter (TextExporter by default; PDF/DOCX backends plug in here)
    let exporter = Arc::new(TextExporter);

    // In-memory sessions, swept once idle
    let sessions = SessionStore::new(config.session_idle_ttl());
    sessions.spawn_idle_sweeper();

    let state = AppState {
        config: config.clone(),
        sessions,
        exporter,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict CORS origins once the frontend host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
