//! Processing log — the durable audit trail of every AI invocation
//! attempt, successful or not.
//!
//! One row per pipeline operation in `ai_processing_logs`. Rows are
//! created `pending` before any I/O, move to `processing` just before the
//! orchestrator call, and are settled exactly once into `completed` or
//! `failed`. Terminal rows are never rewritten: the UPDATEs carry a
//! status guard, and a zero-row update is logged instead of retried.
//! The store belongs to the pipelines — the orchestrator knows nothing
//! about persistence.

#![allow(dead_code)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::{FromRow, PgPool};
use tracing::warn;
use uuid::Uuid;

/// What kind of pipeline operation a log row records.
///
/// `insights_generation` and `workflow_execution` are written by host
/// features that share this table; the pipelines in this crate emit the
/// first three.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingType {
    ResumeParsing,
    CandidateScreening,
    ContentGeneration,
    InsightsGeneration,
    WorkflowExecution,
}

impl ProcessingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingType::ResumeParsing => "resume_parsing",
            ProcessingType::CandidateScreening => "candidate_screening",
            ProcessingType::ContentGeneration => "content_generation",
            ProcessingType::InsightsGeneration => "insights_generation",
            ProcessingType::WorkflowExecution => "workflow_execution",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl ProcessingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingStatus::Pending => "pending",
            ProcessingStatus::Processing => "processing",
            ProcessingStatus::Completed => "completed",
            ProcessingStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ProcessingStatus::Completed | ProcessingStatus::Failed)
    }

    /// The only legal moves: pending → processing, and
    /// pending/processing → completed/failed.
    pub fn can_transition_to(&self, next: ProcessingStatus) -> bool {
        match (self, next) {
            (ProcessingStatus::Pending, ProcessingStatus::Processing) => true,
            (ProcessingStatus::Pending | ProcessingStatus::Processing, next) => next.is_terminal(),
            _ => false,
        }
    }
}

/// Row of `ai_processing_logs`. Column-level layout is part of the
/// external contract (§ audit schema), so names mirror the table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProcessingLogRow {
    pub id: Uuid,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub log_type: String,
    pub provider: Option<String>,
    pub model: Option<String>,
    pub prompt: Option<String>,
    pub response: Option<String>,
    pub status: String,
    pub tokens_used: Option<i32>,
    pub cost: Option<f64>,
    pub processing_time_ms: Option<i32>,
    pub confidence_score: Option<f64>,
    pub metadata: Option<Value>,
    pub error_message: Option<String>,
    pub user_id: Option<Uuid>,
    pub candidate_id: Option<Uuid>,
    pub document_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Fields known at record creation, before any I/O has happened.
#[derive(Debug, Clone)]
pub struct NewProcessingLog {
    pub log_type: ProcessingType,
    pub metadata: Option<Value>,
    pub user_id: Option<Uuid>,
    pub candidate_id: Option<Uuid>,
    pub document_id: Option<Uuid>,
}

/// Fields written when a log settles into `completed`.
#[derive(Debug, Clone)]
pub struct CompletionOutcome {
    pub provider: String,
    pub model: String,
    pub response: String,
    pub tokens_used: i32,
    pub cost: f64,
    pub processing_time_ms: i32,
    pub confidence_score: Option<f64>,
}

#[derive(Clone)]
pub struct ProcessingLogStore {
    pool: PgPool,
}

impl ProcessingLogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a `pending` row and returns its id.
    pub async fn create(&self, new: NewProcessingLog) -> Result<Uuid, sqlx::Error> {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO ai_processing_logs
                (id, type, status, metadata, user_id, candidate_id, document_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(id)
        .bind(new.log_type.as_str())
        .bind(ProcessingStatus::Pending.as_str())
        .bind(new.metadata)
        .bind(new.user_id)
        .bind(new.candidate_id)
        .bind(new.document_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(id)
    }

    /// Moves a pending row to `processing`, storing the bounded prompt
    /// prefix. Full prompts are never stored verbatim.
    pub async fn mark_processing(&self, id: Uuid, prompt_prefix: &str) -> Result<(), sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE ai_processing_logs
            SET status = 'processing', prompt = $2
            WHERE id = $1 AND status = 'pending'
            "#,
        )
        .bind(id)
        .bind(prompt_prefix)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            warn!("processing log {id}: mark_processing skipped (not pending)");
        }
        Ok(())
    }

    /// Settles a row into `completed`. Refuses to touch terminal rows.
    pub async fn mark_completed(
        &self,
        id: Uuid,
        outcome: CompletionOutcome,
    ) -> Result<(), sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE ai_processing_logs
            SET status = 'completed',
                provider = $2,
                model = $3,
                response = $4,
                tokens_used = $5,
                cost = $6,
                processing_time_ms = $7,
                confidence_score = $8,
                completed_at = $9
            WHERE id = $1 AND status IN ('pending', 'processing')
            "#,
        )
        .bind(id)
        .bind(&outcome.provider)
        .bind(&outcome.model)
        .bind(&outcome.response)
        .bind(outcome.tokens_used)
        .bind(outcome.cost)
        .bind(outcome.processing_time_ms)
        .bind(outcome.confidence_score)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            warn!("processing log {id}: mark_completed skipped (already terminal)");
        }
        Ok(())
    }

    /// Settles a row into `failed`. Written even when the failure happens
    /// before any provider call — the log audits every attempt.
    pub async fn mark_failed(&self, id: Uuid, error_message: &str) -> Result<(), sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE ai_processing_logs
            SET status = 'failed', error_message = $2, completed_at = $3
            WHERE id = $1 AND status IN ('pending', 'processing')
            "#,
        )
        .bind(id)
        .bind(error_message)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            warn!("processing log {id}: mark_failed skipped (already terminal)");
        }
        Ok(())
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<ProcessingLogRow>, sqlx::Error> {
        sqlx::query_as::<_, ProcessingLogRow>("SELECT * FROM ai_processing_logs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_wire_names_match_audit_schema() {
        assert_eq!(ProcessingType::ResumeParsing.as_str(), "resume_parsing");
        assert_eq!(
            ProcessingType::CandidateScreening.as_str(),
            "candidate_screening"
        );
        assert_eq!(
            serde_json::to_string(&ProcessingType::ContentGeneration).unwrap(),
            r#""content_generation""#
        );
    }

    #[test]
    fn test_terminal_states() {
        assert!(!ProcessingStatus::Pending.is_terminal());
        assert!(!ProcessingStatus::Processing.is_terminal());
        assert!(ProcessingStatus::Completed.is_terminal());
        assert!(ProcessingStatus::Failed.is_terminal());
    }

    #[test]
    fn test_legal_transitions() {
        use ProcessingStatus::*;
        assert!(Pending.can_transition_to(Processing));
        assert!(Pending.can_transition_to(Completed));
        assert!(Pending.can_transition_to(Failed));
        assert!(Processing.can_transition_to(Completed));
        assert!(Processing.can_transition_to(Failed));
    }

    #[test]
    fn test_no_transition_leaves_a_terminal_state() {
        use ProcessingStatus::*;
        for terminal in [Completed, Failed] {
            for next in [Pending, Processing, Completed, Failed] {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn test_processing_cannot_regress_to_pending() {
        assert!(!ProcessingStatus::Processing.can_transition_to(ProcessingStatus::Pending));
    }

    #[test]
    fn test_log_row_serde_uses_type_key() {
        let row = ProcessingLogRow {
            id: Uuid::new_v4(),
            log_type: "resume_parsing".to_string(),
            provider: Some("moonshot".to_string()),
            model: None,
            prompt: None,
            response: None,
            status: "pending".to_string(),
            tokens_used: None,
            cost: None,
            processing_time_ms: None,
            confidence_score: None,
            metadata: None,
            error_message: None,
            user_id: None,
            candidate_id: None,
            document_id: None,
            created_at: Utc::now(),
            completed_at: None,
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["type"], "resume_parsing");
        assert!(json.get("log_type").is_none());
    }
}
