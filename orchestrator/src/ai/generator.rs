use tracing::{info, warn};

use crate::ai::manager::{TaskRunner, TaskType};
use crate::ai::prompt::build_assessment_prompt;
use crate::ai::providers::TaskOptions;
use crate::ai::rag::ContextSource;
use crate::ai::schema::parse_generated_idp;
use crate::error::ApiError;
use crate::models::{AssessmentSubmission, GeneratedIdp, StructuredProfile};

/// Runs retrieval → prompt → generation → schema validation for one
/// structured profile.
///
/// Retrieval is the only stage allowed to fail without aborting: the prompt
/// falls back to an explicit general-knowledge instruction so the user still
/// gets a plan. Every other failure propagates and nothing partial is
/// returned.
pub async fn generate_idp(
    runner: &dyn TaskRunner,
    context: &dyn ContextSource,
    profile: &StructuredProfile,
) -> Result<GeneratedIdp, ApiError> {
    let rag_query = format!("{}. {}", profile.aspirations, profile.portfolio_text);
    let chunks = match context.find_relevant_chunks(&rag_query).await {
        Ok(chunks) => chunks,
        Err(err) => {
            warn!(error = %err, "context retrieval failed, continuing with empty context");
            Vec::new()
        }
    };

    let submission = AssessmentSubmission {
        riasec_scores: profile.riasec_scores,
        pwb_scores: profile.pwb_scores,
        portfolio_text: profile.portfolio_text.clone(),
        aspirations: profile.aspirations.clone(),
    };
    let prompt = build_assessment_prompt(&submission, &chunks);

    let raw = runner
        .execute_task(TaskType::GenerateDraft, &prompt, TaskOptions::default())
        .await?;

    let idp = parse_generated_idp(&raw)?;
    info!(
        profile_id = %profile.id,
        semesters = idp.roadmap.len(),
        "idp generated and validated"
    );
    Ok(idp)
}
