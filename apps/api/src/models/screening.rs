//! Screening result model and the deterministic score→recommendation
//! mapping applied on top of whatever label the model reports.

use serde::{Deserialize, Serialize};

/// Advancement decision derived from a 0–100 screening score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    AutoReject,
    ManualReview,
    AutoAdvance,
}

impl Recommendation {
    /// Deterministic bucket policy: [0,30] reject, [31,69] review,
    /// [70,100] advance. Scores outside the range are clamped first.
    pub fn from_score(score: f64) -> Self {
        let score = score.clamp(0.0, 100.0);
        if score <= 30.0 {
            Recommendation::AutoReject
        } else if score < 70.0 {
            Recommendation::ManualReview
        } else {
            Recommendation::AutoAdvance
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Recommendation::AutoReject => "auto_reject",
            Recommendation::ManualReview => "manual_review",
            Recommendation::AutoAdvance => "auto_advance",
        }
    }
}

/// Criteria the caller screens a candidate against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobCriteria {
    pub job_title: String,
    #[serde(default)]
    pub required_skills: Vec<String>,
    #[serde(default)]
    pub preferred_skills: Vec<String>,
    #[serde(default)]
    pub min_experience_years: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Raw JSON shape the screening prompt asks the model for.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModelScreeningVerdict {
    pub score: f64,
    pub recommendation: Option<Recommendation>,
    pub reasons: Vec<String>,
    pub matched_criteria: Vec<String>,
    pub missing_criteria: Vec<String>,
    pub ai_content: AiContentSignal,
}

/// Signal that the résumé/profile text itself looks AI-generated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AiContentSignal {
    pub suspected: bool,
    /// 0.0–1.0 confidence in the suspicion.
    pub confidence: f64,
}

/// Final screening verdict returned to callers. The deterministic bucket
/// overrides the model's self-reported label; the model label is kept for
/// audit and `recommendation_conflict` flags disagreement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreeningResult {
    pub score: f64,
    pub recommendation: Recommendation,
    pub model_recommendation: Option<Recommendation>,
    pub recommendation_conflict: bool,
    pub reasons: Vec<String>,
    pub matched_criteria: Vec<String>,
    pub missing_criteria: Vec<String>,
    pub ai_content: AiContentSignal,
}

impl ScreeningResult {
    /// Applies the bucket policy to a raw model verdict.
    pub fn from_verdict(verdict: ModelScreeningVerdict) -> Self {
        let score = verdict.score.clamp(0.0, 100.0);
        let recommendation = Recommendation::from_score(score);
        let conflict = verdict
            .recommendation
            .is_some_and(|label| label != recommendation);
        Self {
            score,
            recommendation,
            model_recommendation: verdict.recommendation,
            recommendation_conflict: conflict,
            reasons: verdict.reasons,
            matched_criteria: verdict.matched_criteria,
            missing_criteria: verdict.missing_criteria,
            ai_content: verdict.ai_content,
        }
    }
}
