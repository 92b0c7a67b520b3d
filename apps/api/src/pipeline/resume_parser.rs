//! Résumé parsing pipeline.
//!
//! Flow: create log → extract text → build prompt → mark processing →
//! orchestrator invoke → mark completed → decode embedded JSON.
//!
//! The log settles on whether the provider responded; JSON decodability
//! is a separate outcome. A `completed` log with a parse error on the
//! caller's side is the designed behavior, not a bug.

use std::path::PathBuf;
use std::time::Instant;

use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::extraction::extract_text;
use crate::models::resume::ParsedResume;
use crate::orchestrator::{InvocationOptions, Orchestrator};
use crate::pipeline::json_extract::decode_embedded;
use crate::pipeline::prompts::{
    truncate_chars, PROMPT_STORAGE_LIMIT, RESUME_PARSE_PROMPT, RESUME_TEXT_BUDGET,
};
use crate::pipeline::{OnParseFailure, SubjectRefs};
use crate::processing_log::{
    CompletionOutcome, NewProcessingLog, ProcessingLogStore, ProcessingType,
};
use crate::providers::ProviderId;

/// Parsing wants determinism, not creativity.
const PARSE_TEMPERATURE: f32 = 0.1;
const PARSE_MAX_TOKENS: u32 = 3_000;

#[derive(Debug, Clone)]
pub struct ParseResumeRequest {
    pub file_path: PathBuf,
    pub mime_type: String,
    pub subject: SubjectRefs,
    pub on_parse_failure: OnParseFailure,
    pub preferred_provider: Option<ProviderId>,
}

#[derive(Debug, Clone)]
pub struct ParseResumeOutcome {
    pub log_id: Uuid,
    pub provider: ProviderId,
    pub model: String,
    pub tokens_used: u32,
    pub cost: f64,
    pub resume: ParsedResume,
}

pub async fn parse_resume(
    logs: &ProcessingLogStore,
    orchestrator: &Orchestrator,
    request: ParseResumeRequest,
) -> Result<ParseResumeOutcome, AppError> {
    let started = Instant::now();

    let log_id = logs
        .create(NewProcessingLog {
            log_type: ProcessingType::ResumeParsing,
            metadata: Some(json!({
                "file_path": request.file_path.display().to_string(),
                "mime_type": request.mime_type,
            })),
            user_id: request.subject.user_id,
            candidate_id: request.subject.candidate_id,
            document_id: request.subject.document_id,
        })
        .await?;

    // Extraction is CPU-bound (PDF decoding), so it runs off the async
    // worker threads. Its failure is audited like any other.
    let path = request.file_path.clone();
    let mime = request.mime_type.clone();
    let extracted = match tokio::task::spawn_blocking(move || extract_text(&path, &mime)).await {
        Ok(Ok(text)) => text,
        Ok(Err(e)) => {
            logs.mark_failed(log_id, &e.to_string()).await?;
            return Err(AppError::Extraction(e));
        }
        Err(join_error) => {
            let e = anyhow::anyhow!("extraction task failed: {join_error}");
            logs.mark_failed(log_id, &e.to_string()).await?;
            return Err(AppError::Internal(e));
        }
    };

    let prompt = RESUME_PARSE_PROMPT.replace(
        "{resume_text}",
        truncate_chars(&extracted, RESUME_TEXT_BUDGET),
    );
    logs.mark_processing(log_id, truncate_chars(&prompt, PROMPT_STORAGE_LIMIT))
        .await?;

    let options = InvocationOptions {
        max_tokens: Some(PARSE_MAX_TOKENS),
        temperature: Some(PARSE_TEMPERATURE),
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

    let decoded: Result<ParsedResume, _> = decode_embedded(&invocation.text);
    let confidence = decoded
        .as_ref()
        .ok()
        .map(|resume| (resume.quality_score / 10.0).clamp(0.0, 1.0));

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

    let resume = match decoded {
        Ok(resume) => resume,
        Err(e) => match request.on_parse_failure {
            OnParseFailure::Strict => {
                return Err(AppError::AiResponseFormat {
                    log_id,
                    detail: e.to_string(),
                })
            }
            OnParseFailure::SubstituteDefault => {
                warn!("resume parse log {log_id}: undecodable response, substituting placeholder");
                ParsedResume::unparsed_fallback(&e.to_string())
            }
        },
    };

    info!(
        provider = %invocation.provider,
        tokens = invocation.tokens_used,
        "resume parsed (log {log_id}, quality {:.1})",
        resume.quality_score
    );

    Ok(ParseResumeOutcome {
        log_id,
        provider: invocation.provider,
        model: invocation.model,
        tokens_used: invocation.tokens_used,
        cost: invocation.cost,
        resume,
    })
}
