//! Ad-hoc content generation — the thin pipeline behind the generic
//! invoke endpoint. No structured decode; the caller gets the raw text
//! plus accounting, and the audit trail still gets its row.

use std::time::Instant;

use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::orchestrator::{InvocationOptions, Orchestrator};
use crate::pipeline::prompts::{truncate_chars, PROMPT_STORAGE_LIMIT};
use crate::pipeline::SubjectRefs;
use crate::processing_log::{
    CompletionOutcome, NewProcessingLog, ProcessingLogStore, ProcessingType,
};
use crate::providers::ProviderId;

#[derive(Debug, Clone)]
pub struct GenerateContentRequest {
    pub prompt: String,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub preferred_provider: Option<ProviderId>,
    pub subject: SubjectRefs,
}

#[derive(Debug, Clone)]
pub struct GenerateContentOutcome {
    pub log_id: Uuid,
    pub text: String,
    pub provider: ProviderId,
    pub model: String,
    pub tokens_used: u32,
    pub cost: f64,
}

pub async fn generate_content(
    logs: &ProcessingLogStore,
    orchestrator: &Orchestrator,
    request: GenerateContentRequest,
) -> Result<GenerateContentOutcome, AppError> {
    let started = Instant::now();

    let log_id = logs
        .create(NewProcessingLog {
            log_type: ProcessingType::ContentGeneration,
            metadata: None,
            user_id: request.subject.user_id,
            candidate_id: request.subject.candidate_id,
            document_id: request.subject.document_id,
        })
        .await?;

    logs.mark_processing(log_id, truncate_chars(&request.prompt, PROMPT_STORAGE_LIMIT))
        .await?;

    let options = InvocationOptions {
        max_tokens: request.max_tokens,
        temperature: request.temperature,
        preferred_provider: request.preferred_provider,
    };

    let invocation = match orchestrator.invoke(&request.prompt, &options).await {
        Ok(result) => result,
        Err(e) => {
            logs.mark_failed(log_id, &e.to_string()).await?;
            return Err(AppError::AiUnavailable {
                log_id,
                detail: e.to_string(),
            });
        }
    };

    logs.mark_completed(
        log_id,
        CompletionOutcome {
            provider: invocation.provider.to_string(),
            model: invocation.model.clone(),
            response: invocation.text.clone(),
            tokens_used: invocation.tokens_used as i32,
            cost: invocation.cost,
            processing_time_ms: started.elapsed().as_millis() as i32,
            confidence_score: None,
        },
    )
    .await?;

    info!(
        provider = %invocation.provider,
        tokens = invocation.tokens_used,
        "content generated (log {log_id})"
    );

    Ok(GenerateContentOutcome {
        log_id,
        text: invocation.text,
        provider: invocation.provider,
        model: invocation.model,
        tokens_used: invocation.tokens_used,
        cost: invocation.cost,
    })
}
