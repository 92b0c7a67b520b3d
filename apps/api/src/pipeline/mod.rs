//! AI processing pipelines — résumé parsing, candidate screening, and
//! ad-hoc generation.
//!
//! Each pipeline owns its processing-log lifecycle end to end: the record
//! is created `pending` before any I/O, and the pipeline settles it into
//! exactly one terminal state, including failures that happen before any
//! provider is called. The orchestrator stays persistence-free.

pub mod generate;
pub mod handlers;
pub mod json_extract;
pub mod prompts;
pub mod resume_parser;
pub mod screening;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Foreign references attached to a processing-log record: who asked, and
/// which entity the operation is about.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SubjectRefs {
    pub user_id: Option<Uuid>,
    pub candidate_id: Option<Uuid>,
    pub document_id: Option<Uuid>,
}

/// Policy for a provider response whose text carries no decodable JSON.
/// The AI call itself succeeded (the log stays `completed`); this decides
/// what the caller gets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnParseFailure {
    /// Surface `AiResponseFormat` to the caller.
    #[default]
    Strict,
    /// Return a low-confidence placeholder result instead.
    SubstituteDefault,
}
