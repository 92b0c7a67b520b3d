use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::orchestrator::Orchestrator;
use crate::processing_log::ProcessingLogStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Single entry point for all AI calls; owns the provider chain and
    /// the usage counters.
    pub orchestrator: Arc<Orchestrator>,
    pub logs: ProcessingLogStore,
    /// Kept for host middleware (rate limiting, feature flags) that reads
    /// configuration at request time.
    #[allow(dead_code)]
    pub config: Config,
}
