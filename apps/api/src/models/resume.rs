//! Structured output of the résumé parsing pipeline.
//!
//! Field names are camelCase on the wire — the exact shape the parsing
//! prompt instructs the model to return. Everything defaults, so a
//! partially-filled model response still decodes; required-ness is a
//! quality concern (flags/quality score), not a decode concern.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParsedResume {
    pub personal_info: PersonalInfo,
    pub experience: Vec<ExperienceEntry>,
    pub education: Vec<EducationEntry>,
    pub skills: Vec<SkillEntry>,
    pub certifications: Vec<CertificationEntry>,
    pub languages: Vec<LanguageEntry>,
    pub summary: String,
    pub salary_expectation: Option<String>,
    /// 0–10 AI-assigned rating of the résumé's strength.
    pub quality_score: f64,
    pub ai_insights: AiInsights,
    pub flags: Vec<ResumeFlag>,
}

impl ParsedResume {
    /// Low-confidence placeholder returned under the `SubstituteDefault`
    /// parse-failure policy: quality 0 and an explicit flag, never
    /// mistakable for a real parse.
    pub fn unparsed_fallback(detail: &str) -> Self {
        Self {
            summary: "Automatic parsing failed; manual review required.".to_string(),
            quality_score: 0.0,
            flags: vec![ResumeFlag {
                flag_type: "parse_failure".to_string(),
                severity: "high".to_string(),
                description: detail.to_string(),
                suggestions: vec!["Re-run parsing or review the document manually".to_string()],
            }],
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonalInfo {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub links: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExperienceEntry {
    pub company: String,
    pub title: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub description: Option<String>,
    pub highlights: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EducationEntry {
    pub institution: String,
    pub degree: Option<String>,
    pub field: Option<String>,
    pub graduation_year: Option<i32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SkillEntry {
    pub name: String,
    pub category: Option<String>,
    pub level: Option<String>,
    pub years_experience: Option<f64>,
    pub verified: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CertificationEntry {
    pub name: String,
    pub issuer: Option<String>,
    pub year: Option<i32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LanguageEntry {
    pub name: String,
    pub proficiency: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AiInsights {
    pub strengths: Vec<String>,
    pub concerns: Vec<String>,
    /// 0–100 fit against the role family the candidate targets.
    pub fit_score: f64,
    pub recommendations: Vec<String>,
    pub skills_gap: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResumeFlag {
    pub flag_type: String,
    pub severity: String,
    pub description: String,
    pub suggestions: Vec<String>,
}
