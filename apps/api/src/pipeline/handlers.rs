//! Axum route handlers for the AI pipeline API.

use std::collections::HashMap;
use std::path::PathBuf;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::resume::ParsedResume;
use crate::models::screening::{JobCriteria, ScreeningResult};
use crate::orchestrator::usage::UsageCounter;
use crate::pipeline::generate::{generate_content, GenerateContentRequest};
use crate::pipeline::resume_parser::{parse_resume, ParseResumeRequest};
use crate::pipeline::screening::{screen_candidate, ScreenCandidateRequest};
use crate::pipeline::{OnParseFailure, SubjectRefs};
use crate::processing_log::ProcessingLogRow;
use crate::providers::ProviderId;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct GenerateHttpRequest {
    pub prompt: String,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub provider: Option<ProviderId>,
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct GenerateHttpResponse {
    pub log_id: Uuid,
    pub text: String,
    pub provider: ProviderId,
    pub model: String,
    pub tokens_used: u32,
    pub cost: f64,
}

#[derive(Debug, Deserialize)]
pub struct ParseResumeHttpRequest {
    pub file_path: String,
    pub mime_type: String,
    #[serde(default)]
    pub user_id: Option<Uuid>,
    #[serde(default)]
    pub candidate_id: Option<Uuid>,
    #[serde(default)]
    pub document_id: Option<Uuid>,
    #[serde(default)]
    pub on_parse_failure: OnParseFailure,
    pub provider: Option<ProviderId>,
}

#[derive(Debug, Serialize)]
pub struct ParseResumeHttpResponse {
    pub log_id: Uuid,
    pub provider: ProviderId,
    pub model: String,
    pub tokens_used: u32,
    pub cost: f64,
    pub resume: ParsedResume,
}

#[derive(Debug, Deserialize)]
pub struct ScreenHttpRequest {
    pub criteria: JobCriteria,
    pub user_id: Option<Uuid>,
    pub provider: Option<ProviderId>,
}

#[derive(Debug, Serialize)]
pub struct ScreenHttpResponse {
    pub log_id: Uuid,
    pub provider: ProviderId,
    pub tokens_used: u32,
    pub cost: f64,
    pub screening: ScreeningResult,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/ai/generate
pub async fn handle_generate(
    State(state): State<AppState>,
    Json(request): Json<GenerateHttpRequest>,
) -> Result<Json<GenerateHttpResponse>, AppError> {
    if request.prompt.trim().is_empty() {
        return Err(AppError::Validation("prompt cannot be empty".to_string()));
    }

    let outcome = generate_content(
        &state.logs,
        &state.orchestrator,
        GenerateContentRequest {
            prompt: request.prompt,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            preferred_provider: request.provider,
            subject: SubjectRefs {
                user_id: request.user_id,
                ..Default::default()
            },
        },
    )
    .await?;

    Ok(Json(GenerateHttpResponse {
        log_id: outcome.log_id,
        text: outcome.text,
        provider: outcome.provider,
        model: outcome.model,
        tokens_used: outcome.tokens_used,
        cost: outcome.cost,
    }))
}

/// POST /api/v1/ai/resumes/parse
///
/// The file is already resident (upload mechanics live in the documents
/// service); this endpoint receives its path and MIME type.
pub async fn handle_parse_resume(
    State(state): State<AppState>,
    Json(request): Json<ParseResumeHttpRequest>,
) -> Result<Json<ParseResumeHttpResponse>, AppError> {
    if request.file_path.trim().is_empty() {
        return Err(AppError::Validation("file_path cannot be empty".to_string()));
    }

    let outcome = parse_resume(
        &state.logs,
        &state.orchestrator,
        ParseResumeRequest {
            file_path: PathBuf::from(request.file_path),
            mime_type: request.mime_type,
            subject: SubjectRefs {
                user_id: request.user_id,
                candidate_id: request.candidate_id,
                document_id: request.document_id,
            },
            on_parse_failure: request.on_parse_failure,
            preferred_provider: request.provider,
        },
    )
    .await?;

    Ok(Json(ParseResumeHttpResponse {
        log_id: outcome.log_id,
        provider: outcome.provider,
        model: outcome.model,
        tokens_used: outcome.tokens_used,
        cost: outcome.cost,
        resume: outcome.resume,
    }))
}

/// POST /api/v1/ai/candidates/:id/screen
pub async fn handle_screen_candidate(
    State(state): State<AppState>,
    Path(candidate_id): Path<Uuid>,
    Json(request): Json<ScreenHttpRequest>,
) -> Result<Json<ScreenHttpResponse>, AppError> {
    if request.criteria.job_title.trim().is_empty() {
        return Err(AppError::Validation(
            "criteria.job_title cannot be empty".to_string(),
        ));
    }

    let outcome = screen_candidate(
        &state.db,
        &state.logs,
        &state.orchestrator,
        ScreenCandidateRequest {
            candidate_id,
            criteria: request.criteria,
            user_id: request.user_id,
            preferred_provider: request.provider,
        },
    )
    .await?;

    Ok(Json(ScreenHttpResponse {
        log_id: outcome.log_id,
        provider: outcome.provider,
        tokens_used: outcome.tokens_used,
        cost: outcome.cost,
        screening: outcome.result,
    }))
}

/// GET /api/v1/ai/usage
pub async fn handle_usage_stats(
    State(state): State<AppState>,
) -> Json<HashMap<ProviderId, UsageCounter>> {
    Json(state.orchestrator.usage_stats())
}

/// GET /api/v1/ai/providers/health
pub async fn handle_provider_health(
    State(state): State<AppState>,
) -> Json<HashMap<ProviderId, bool>> {
    Json(state.orchestrator.health_check().await)
}

/// GET /api/v1/ai/logs/:id
pub async fn handle_get_log(
    State(state): State<AppState>,
    Path(log_id): Path<Uuid>,
) -> Result<Json<ProcessingLogRow>, AppError> {
    let row = state
        .logs
        .get(log_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Processing log {log_id} not found")))?;
    Ok(Json(row))
}
