mod config;
mod db;
mod errors;
mod extraction;
mod models;
mod orchestrator;
mod pipeline;
mod processing_log;
mod providers;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::orchestrator::{HttpTransport, Orchestrator};
use crate::processing_log::ProcessingLogStore;
use crate::providers::ProviderRegistry;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            let target = env!("CARGO_PKG_NAME").replace('-', "_");
            EnvFilter::new(format!("{target}={}", &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting TalentDesk API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;

    // Build the provider registry and the fallback orchestrator
    let registry = ProviderRegistry::from_config(&config);
    match registry.primary_provider() {
        Some(primary) => info!(
            "AI providers configured, primary: {} ({})",
            primary.id, primary.model
        ),
        None => info!("No AI providers configured — all invocations will fail over to nothing"),
    }
    let transport = Arc::new(HttpTransport::new()?);
    let orchestrator = Arc::new(Orchestrator::new(registry, transport));

    // Processing log store (audit trail)
    let logs = ProcessingLogStore::new(db.clone());

    // Build app state
    let state = AppState {
        db,
        orchestrator,
        logs,
        config: config.clone(),
    };

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
