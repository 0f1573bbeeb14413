use tracing::info;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::{AssessmentSubmission, StructuredProfile};

/// Highest-scoring dimension. Comparison is strict, so on a tie the first
/// dimension in declaration order wins; this is the documented tie-break.
fn dominant(entries: &[(&'static str, u8)]) -> Result<&'static str, ApiError> {
    let mut best: Option<(&'static str, u8)> = None;
    for &(name, score) in entries {
        match best {
            None => best = Some((name, score)),
            Some((_, top)) if score > top => best = Some((name, score)),
            Some(_) => {}
        }
    }
    best.map(|(name, _)| name)
        .ok_or_else(|| ApiError::Validation("score map is empty".to_string()))
}

/// Derives the structured profile for a stored submission: dominant RIASEC
/// and PWB dimensions plus a one-sentence summary. Pure computation, no I/O.
pub fn analyze_profile(
    submission_id: Uuid,
    submission: &AssessmentSubmission,
) -> Result<StructuredProfile, ApiError> {
    let dominant_riasec = dominant(&submission.riasec_scores.entries())?;
    let dominant_pwb = dominant(&submission.pwb_scores.entries())?;

    let analyzed_summary = format!(
        "An individual aspiring toward {}, showing particular strength in {} (PWB) and a strong {} vocational interest (RIASEC).",
        submission.aspirations.trim(),
        dominant_pwb.replace('_', " "),
        dominant_riasec,
    );

    info!(%dominant_riasec, %dominant_pwb, "profile analysis complete");

    Ok(StructuredProfile {
        id: Uuid::new_v4(),
        submission_id,
        aspirations: submission.aspirations.clone(),
        portfolio_text: submission.portfolio_text.clone(),
        riasec_scores: submission.riasec_scores,
        pwb_scores: submission.pwb_scores,
        dominant_riasec: dominant_riasec.to_string(),
        dominant_pwb: dominant_pwb.to_string(),
        analyzed_summary,
    })
}
