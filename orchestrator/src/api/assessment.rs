use std::sync::Arc;

use tracing::info;
use warp::{Rejection, Reply};

use crate::ai::{analyzer, formatter, generator};
use crate::api::AppState;
use crate::db;
use crate::error::ApiError;
use crate::models::{AssessmentResponse, AssessmentSubmission};

/// Full generation pipeline for one submission, strictly sequential.
/// Failures after a persistence step leave the earlier rows committed —
/// there is no compensation, only the terminal error.
pub async fn handle_submit(
    submission: AssessmentSubmission,
    state: Arc<AppState>,
) -> Result<impl Reply, Rejection> {
    // validate at the boundary, before any side effect
    submission.validate().map_err(warp::reject::custom)?;

    let submission_id = db::insert_submission(&state.db_pool, &submission)
        .await
        .map_err(warp::reject::custom)?;
    info!(%submission_id, "assessment submission stored");

    let profile =
        analyzer::analyze_profile(submission_id, &submission).map_err(warp::reject::custom)?;
    db::insert_profile(&state.db_pool, &profile)
        .await
        .map_err(warp::reject::custom)?;

    // retrieval failures are tolerated inside generate_idp; every other
    // failure aborts here with nothing partial persisted
    let idp = generator::generate_idp(state.ai.as_ref(), state.retriever.as_ref(), &profile)
        .await
        .map_err(warp::reject::custom)?;

    let html = formatter::format_idp(&idp);
    let json_content = serde_json::to_value(&idp)
        .map_err(|err| warp::reject::custom(ApiError::Persistence(err.to_string())))?;

    let record_id = db::insert_idp_record(&state.db_pool, profile.id, &json_content, &html)
        .await
        .map_err(warp::reject::custom)?;

    state.idp_cache.remove(&profile.id.to_string());
    info!(%record_id, profile_id = %profile.id, "idp record stored");

    Ok(warp::reply::json(&AssessmentResponse {
        success: true,
        idp_record_id: record_id,
        profile_id: profile.id,
    }))
}
