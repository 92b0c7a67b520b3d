pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::pipeline::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // AI pipeline API
        .route("/api/v1/ai/generate", post(handlers::handle_generate))
        .route(
            "/api/v1/ai/resumes/parse",
            post(handlers::handle_parse_resume),
        )
        .route(
            "/api/v1/ai/candidates/:id/screen",
            post(handlers::handle_screen_candidate),
        )
        .route("/api/v1/ai/usage", get(handlers::handle_usage_stats))
        .route(
            "/api/v1/ai/providers/health",
            get(handlers::handle_provider_health),
        )
        .route("/api/v1/ai/logs/:id", get(handlers::handle_get_log))
        .with_state(state)
}
