//! Candidate screening pipeline.
//!
//! Loads the candidate's summarized profile, asks the provider chain for
//! a verdict, and applies the deterministic score buckets on top of the
//! model's own label. Same processing-log lifecycle as résumé parsing,
//! typed `candidate_screening`.

use std::time::Instant;

use serde_json::json;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::candidate::{CandidateProfile, CandidateRow};
use crate::models::screening::{JobCriteria, ModelScreeningVerdict, ScreeningResult};
use crate::orchestrator::{InvocationOptions, Orchestrator};
use crate::pipeline::json_extract::decode_embedded;
use crate::pipeline::prompts::{truncate_chars, PROMPT_STORAGE_LIMIT, SCREENING_PROMPT};
use crate::processing_log::{
    CompletionOutcome, NewProcessingLog, ProcessingLogStore, ProcessingType,
};
use crate::providers::ProviderId;

/// Screening tolerates some judgment; parsing does not.
const SCREEN_TEMPERATURE: f32 = 0.5;
const SCREEN_MAX_TOKENS: u32 = 1_500;

#[derive(Debug, Clone)]
pub struct ScreenCandidateRequest {
    pub candidate_id: Uuid,
    pub criteria: JobCriteria,
    pub user_id: Option<Uuid>,
    pub preferred_provider: Option<ProviderId>,
}

#[derive(Debug, Clone)]
pub struct ScreenCandidateOutcome {
    pub log_id: Uuid,
    pub provider: ProviderId,
    pub tokens_used: u32,
    pub cost: f64,
    pub result: ScreeningResult,
}

pub async fn screen_candidate(
    pool: &PgPool,
    logs: &ProcessingLogStore,
    orchestrator: &Orchestrator,
    request: ScreenCandidateRequest,
) -> Result<ScreenCandidateOutcome, AppError> {
    let row: Option<CandidateRow> = sqlx::query_as(
        r#"
        SELECT id, full_name, experience_years, skills, status, quality_score, created_at
        FROM candidates
        WHERE id = $1
        "#,
    )
    .bind(request.candidate_id)
    .fetch_optional(pool)
    .await?;

    let profile: CandidateProfile = row
        .ok_or_else(|| AppError::NotFound(format!("Candidate {} not found", request.candidate_id)))?
        .into();

    let started = Instant::now();

    let log_id = logs
        .create(NewProcessingLog {
            log_type: ProcessingType::CandidateScreening,
            metadata: Some(json!({ "job_title": request.criteria.job_title })),
            user_id: request.user_id,
            candidate_id: Some(request.candidate_id),
            document_id: None,
        })
        .await?;

    let prompt = build_screening_prompt(&profile, &request.criteria)?;
    logs.mark_processing(log_id, truncate_chars(&prompt, PROMPT_STORAGE_LIMIT))
        .await?;

    let options = InvocationOptions {
        max_tokens: Some(SCREEN_MAX_TOKENS),
        temperature: Some(SCREEN_TEMPERATURE),
        preferred_provider: request.preferred_provider,
    };

    let invocation = match orchestrator.invoke(&prompt, &options).await {
        Ok(result) => result,
        Err(e) => {
            logs.mark_failed(log_id, &e.to_string()).await?;
            return Err(AppError::AiUnavailable {
                log_id,
                detail: e.to_string(),
            });
        }
    };

    let decoded: Result<ModelScreeningVerdict, _> = decode_embedded(&invocation.text);
    let confidence = decoded
        .as_ref()
        .ok()
        .map(|verdict| (verdict.score / 100.0).clamp(0.0, 1.0));

    logs.mark_completed(
        log_id,
        CompletionOutcome {
            provider: invocation.provider.to_string(),
            model: invocation.model.clone(),
            response: invocation.text.clone(),
            tokens_used: invocation.tokens_used as i32,
            cost: invocation.cost,
            processing_time_ms: started.elapsed().as_millis() as i32,
            confidence_score: confidence,
        },
    )
    .await?;

    let verdict = decoded.map_err(|e| AppError::AiResponseFormat {
        log_id,
        detail: e.to_string(),
    })?;

    let result = ScreeningResult::from_verdict(verdict);
    if result.recommendation_conflict {
        warn!(
            "screening log {log_id}: model said {:?}, score {} buckets to {:?}",
            result.model_recommendation, result.score, result.recommendation
        );
    }

    info!(
        provider = %invocation.provider,
        score = result.score,
        recommendation = result.recommendation.as_str(),
        "candidate {} screened (log {log_id})",
        request.candidate_id
    );

    Ok(ScreenCandidateOutcome {
        log_id,
        provider: invocation.provider,
        tokens_used: invocation.tokens_used,
        cost: invocation.cost,
        result,
    })
}

fn build_screening_prompt(
    profile: &CandidateProfile,
    criteria: &JobCriteria,
) -> Result<String, AppError> {
    let candidate_json = serde_json::to_string_pretty(profile)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to serialize profile: {e}")))?;
    let criteria_json = serde_json::to_string_pretty(criteria)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to serialize criteria: {e}")))?;

    Ok(SCREENING_PROMPT
        .replace("{candidate_json}", &candidate_json)
        .replace("{criteria_json}", &criteria_json))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_profile() -> CandidateProfile {
        CandidateRow {
            id: Uuid::new_v4(),
            full_name: "Jane Doe".to_string(),
            experience_years: Some(6.0),
            skills: vec!["Rust".to_string(), "Postgres".to_string()],
            status: "active".to_string(),
            quality_score: Some(8.0),
            created_at: Utc::now(),
        }
        .into()
    }

    fn sample_criteria() -> JobCriteria {
        JobCriteria {
            job_title: "Senior Rust Engineer".to_string(),
            required_skills: vec!["Rust".to_string()],
            preferred_skills: vec!["Kubernetes".to_string()],
            min_experience_years: Some(5.0),
            notes: None,
        }
    }

    #[test]
    fn test_screening_prompt_embeds_profile_and_criteria() {
        let prompt = build_screening_prompt(&sample_profile(), &sample_criteria()).unwrap();
        assert!(prompt.contains("Jane Doe"));
        assert!(prompt.contains("Senior Rust Engineer"));
        assert!(!prompt.contains("{candidate_json}"));
        assert!(!prompt.contains("{criteria_json}"));
    }

    #[test]
    fn test_screening_prompt_keeps_schema_instruction() {
        let prompt = build_screening_prompt(&sample_profile(), &sample_criteria()).unwrap();
        assert!(prompt.contains("matchedCriteria"));
        assert!(prompt.contains("aiContent"));
    }
}
