use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns service status plus which provider currently leads the chain.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let registry = state.orchestrator.registry();
    let primary = registry.primary_provider().map(|p| p.id.as_str());
    let available: Vec<&str> = registry
        .available_providers()
        .iter()
        .map(|p| p.id.as_str())
        .collect();

    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "talentdesk-api",
        "primary_provider": primary,
        "available_providers": available,
    }))
}
