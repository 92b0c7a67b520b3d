//! Prompt constants for the AI pipelines. Templates carry `{placeholder}`
//! markers filled with `str::replace` before dispatch.

/// Character budget for résumé text embedded in the parsing prompt.
/// Bounds provider token cost; anything beyond it is dropped.
pub const RESUME_TEXT_BUDGET: usize = 6_000;

/// Character budget for the prompt prefix persisted on the processing
/// log. Bounds row size; the full prompt is never stored verbatim.
pub const PROMPT_STORAGE_LIMIT: usize = 2_000;

/// Résumé parsing prompt. Replace `{resume_text}` before sending.
pub const RESUME_PARSE_PROMPT: &str = r#"You are an expert technical recruiter. Parse the resume below into structured data.

Respond with a single JSON object and nothing else. Use this EXACT schema (no extra fields):
{
  "personalInfo": {"fullName": "", "email": "", "phone": "", "location": "", "links": []},
  "experience": [{"company": "", "title": "", "startDate": "YYYY-MM", "endDate": "YYYY-MM or null", "description": "", "highlights": []}],
  "education": [{"institution": "", "degree": "", "field": "", "graduationYear": 2020}],
  "skills": [{"name": "", "category": "", "level": "beginner|intermediate|advanced|expert", "yearsExperience": 0, "verified": false}],
  "certifications": [{"name": "", "issuer": "", "year": 2020}],
  "languages": [{"name": "", "proficiency": ""}],
  "summary": "",
  "salaryExpectation": null,
  "qualityScore": 0,
  "aiInsights": {"strengths": [], "concerns": [], "fitScore": 0, "recommendations": [], "skillsGap": []},
  "flags": [{"flagType": "", "severity": "low|medium|high", "description": "", "suggestions": []}]
}

Rules:
- qualityScore is 0-10: overall strength of the resume (evidence of impact, clarity, seniority).
- fitScore is 0-100 against the role family the candidate is clearly targeting.
- flags capture anomalies: employment gaps, inconsistent dates, keyword stuffing, missing contact info.
- Use null for unknown scalar values and [] for unknown lists. Never invent facts.

RESUME:
{resume_text}"#;

/// Candidate screening prompt. Replace `{candidate_json}` and
/// `{criteria_json}` before sending.
pub const SCREENING_PROMPT: &str = r#"You are screening a candidate against job criteria.

CANDIDATE PROFILE:
{candidate_json}

JOB CRITERIA:
{criteria_json}

Respond with a single JSON object and nothing else, using this EXACT schema:
{
  "score": 0,
  "recommendation": "auto_reject|manual_review|auto_advance",
  "reasons": [],
  "matchedCriteria": [],
  "missingCriteria": [],
  "aiContent": {"suspected": false, "confidence": 0.0}
}

Rules:
- score is 0-100: how well the candidate matches the criteria.
- reasons: at most five short sentences justifying the score.
- matchedCriteria / missingCriteria: criteria names from the job criteria only.
- aiContent.suspected: true if the profile text reads as machine-generated boilerplate."#;

/// Truncates on a char boundary to at most `budget` characters.
pub fn truncate_chars(text: &str, budget: usize) -> &str {
    match text.char_indices().nth(budget) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
