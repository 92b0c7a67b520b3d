//! Candidate rows and the summarized profile fed into screening prompts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Row of the host CRM's `candidates` table (the columns this pipeline
/// reads; the full table is owned by the REST layer).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CandidateRow {
    pub id: Uuid,
    pub full_name: String,
    pub experience_years: Option<f64>,
    pub skills: Vec<String>,
    pub status: String,
    pub quality_score: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// What the screening prompt actually sees.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateProfile {
    pub id: Uuid,
    pub full_name: String,
    pub experience_years: f64,
    pub skills: Vec<String>,
    pub status: String,
    pub quality_score: Option<f64>,
}

impl From<CandidateRow> for CandidateProfile {
    fn from(row: CandidateRow) -> Self {
        Self {
            id: row.id,
            full_name: row.full_name,
            experience_years: row.experience_years.unwrap_or(0.0),
            skills: row.skills,
            status: row.status,
            quality_score: row.quality_score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_defaults_missing_experience_to_zero() {
        let row = CandidateRow {
            id: Uuid::new_v4(),
            full_name: "Jane Doe".to_string(),
            experience_years: None,
            skills: vec!["Rust".to_string()],
            status: "active".to_string(),
            quality_score: Some(7.5),
            created_at: Utc::now(),
        };
        let profile = CandidateProfile::from(row);
        assert_eq!(profile.experience_years, 0.0);
        assert_eq!(profile.skills, vec!["Rust".to_string()]);
    }
}
