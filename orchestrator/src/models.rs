use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;

pub const MIN_PORTFOLIO_CHARS: usize = 100;
pub const MIN_ASPIRATIONS_CHARS: usize = 20;

const MIN_SCORE: u8 = 1;
const MAX_SCORE: u8 = 5;

/// Holland Code vocational-interest scores, one per dimension, each 1-5.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RiasecScores {
    pub realistic: u8,
    pub investigative: u8,
    pub artistic: u8,
    pub social: u8,
    pub enterprising: u8,
    pub conventional: u8,
}

impl RiasecScores {
    /// Fixed declaration order. Dominant-trait selection depends on it:
    /// the first dimension listed here wins ties.
    pub fn entries(&self) -> [(&'static str, u8); 6] {
        [
            ("realistic", self.realistic),
            ("investigative", self.investigative),
            ("artistic", self.artistic),
            ("social", self.social),
            ("enterprising", self.enterprising),
            ("conventional", self.conventional),
        ]
    }
}

/// Ryff psychological well-being scores, one per dimension, each 1-5.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PwbScores {
    pub self_acceptance: u8,
    pub positive_relations: u8,
    pub autonomy: u8,
    pub environmental_mastery: u8,
    pub purpose_in_life: u8,
    pub personal_growth: u8,
}

impl PwbScores {
    /// Fixed declaration order, see `RiasecScores::entries`.
    pub fn entries(&self) -> [(&'static str, u8); 6] {
        [
            ("self_acceptance", self.self_acceptance),
            ("positive_relations", self.positive_relations),
            ("autonomy", self.autonomy),
            ("environmental_mastery", self.environmental_mastery),
            ("purpose_in_life", self.purpose_in_life),
            ("personal_growth", self.personal_growth),
        ]
    }
}

/// Raw assessment payload as submitted by the client. Immutable once stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentSubmission {
    pub riasec_scores: RiasecScores,
    pub pwb_scores: PwbScores,
    pub portfolio_text: String,
    pub aspirations: String,
}

impl AssessmentSubmission {
    /// Boundary validation. Runs before any side effect; error messages name
    /// the offending field.
    pub fn validate(&self) -> Result<(), ApiError> {
        for (name, score) in self.riasec_scores.entries() {
            if !(MIN_SCORE..=MAX_SCORE).contains(&score) {
                return Err(ApiError::Validation(format!(
                    "riasec_scores.{name} must be between {MIN_SCORE} and {MAX_SCORE}, got {score}"
                )));
            }
        }
        for (name, score) in self.pwb_scores.entries() {
            if !(MIN_SCORE..=MAX_SCORE).contains(&score) {
                return Err(ApiError::Validation(format!(
                    "pwb_scores.{name} must be between {MIN_SCORE} and {MAX_SCORE}, got {score}"
                )));
            }
        }
        if self.portfolio_text.chars().count() < MIN_PORTFOLIO_CHARS {
            return Err(ApiError::Validation(format!(
                "portfolio_text must be at least {MIN_PORTFOLIO_CHARS} characters"
            )));
        }
        if self.aspirations.chars().count() < MIN_ASPIRATIONS_CHARS {
            return Err(ApiError::Validation(format!(
                "aspirations must be at least {MIN_ASPIRATIONS_CHARS} characters"
            )));
        }
        Ok(())
    }
}

/// Profile derived from a submission (1:1). Never mutated after creation.
#[derive(Debug, Clone, Serialize)]
pub struct StructuredProfile {
    pub id: Uuid,
    pub submission_id: Uuid,
    pub aspirations: String,
    pub portfolio_text: String,
    pub riasec_scores: RiasecScores,
    pub pwb_scores: PwbScores,
    pub dominant_riasec: String,
    pub dominant_pwb: String,
    pub analyzed_summary: String,
}

/// One knowledge-base hit. `similarity` is populated at query time by the
/// stored function and is not a persisted column.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct KnowledgeChunk {
    pub id: Uuid,
    pub content_text: String,
    pub source_document: String,
    pub metadata: serde_json::Value,
    pub similarity: f64,
}

/// The model's structured output. Parsed from untrusted text and validated
/// before anything downstream trusts a field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedIdp {
    pub linkedin_summary: String,
    pub potential_analysis: String,
    pub career_goals_analysis: String,
    pub roadmap: Vec<RoadmapSemester>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoadmapSemester {
    pub semester: u32,
    pub theme: String,
    pub academic: DevelopmentArea,
    pub non_academic: DevelopmentArea,
}

/// Shared shape for the academic and non-academic halves of a semester.
/// The academic half fills `courses`, the non-academic half fills
/// `development_programs`/`clubs`/`mentors`; all lists default to empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DevelopmentArea {
    pub focus: String,
    #[serde(default)]
    pub courses: Vec<String>,
    #[serde(default)]
    pub development_programs: Vec<String>,
    #[serde(default)]
    pub clubs: Vec<String>,
    #[serde(default)]
    pub mentors: Vec<String>,
    #[serde(default)]
    pub knowledge: Option<String>,
    #[serde(default)]
    pub skills: Option<String>,
    #[serde(default)]
    pub attitude: Option<String>,
    pub kpis: Vec<String>,
}

/// Persisted IDP record, read back by "latest for profile".
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct IdpRecord {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub json_content: serde_json::Value,
    pub html_content: String,
    pub status: String,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

// API request/response models

#[derive(Debug, Serialize)]
pub struct AssessmentResponse {
    pub success: bool,
    pub idp_record_id: Uuid,
    pub profile_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct LatestIdpQuery {
    pub profile_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct LatestIdpResponse {
    pub exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<IdpRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_submission() -> AssessmentSubmission {
        AssessmentSubmission {
            riasec_scores: RiasecScores {
                realistic: 5,
                investigative: 1,
                artistic: 1,
                social: 1,
                enterprising: 1,
                conventional: 1,
            },
            pwb_scores: PwbScores {
                self_acceptance: 5,
                positive_relations: 1,
                autonomy: 1,
                environmental_mastery: 1,
                purpose_in_life: 1,
                personal_growth: 1,
            },
            portfolio_text: "x".repeat(120),
            aspirations: "Becoming a robotics engineer".to_string(),
        }
    }

    #[test]
    fn accepts_a_valid_submission() {
        assert!(valid_submission().validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_scores_naming_the_field() {
        let mut submission = valid_submission();
        submission.riasec_scores.artistic = 0;
        let err = submission.validate().unwrap_err();
        assert!(err.to_string().contains("riasec_scores.artistic"));

        let mut submission = valid_submission();
        submission.pwb_scores.autonomy = 6;
        let err = submission.validate().unwrap_err();
        assert!(err.to_string().contains("pwb_scores.autonomy"));
    }

    #[test]
    fn rejects_short_free_text_fields() {
        let mut submission = valid_submission();
        submission.portfolio_text = "too short".to_string();
        let err = submission.validate().unwrap_err();
        assert!(err.to_string().contains("portfolio_text"));

        let mut submission = valid_submission();
        submission.aspirations = "short".to_string();
        let err = submission.validate().unwrap_err();
        assert!(err.to_string().contains("aspirations"));
    }
}
