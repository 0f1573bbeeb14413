use anyhow::Result;
use pgvector::Vector;
use sqlx::{postgres::PgPoolOptions, Pool, Postgres};
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::{AssessmentSubmission, IdpRecord, KnowledgeChunk, StructuredProfile};

pub type DbPool = Pool<Postgres>;

pub async fn create_pool(database_url: &str) -> Result<DbPool> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Stores the raw submission verbatim and returns its generated id.
pub async fn insert_submission(
    pool: &DbPool,
    submission: &AssessmentSubmission,
) -> Result<Uuid, ApiError> {
    let id = Uuid::new_v4();
    let payload = serde_json::to_value(submission)
        .map_err(|err| ApiError::Persistence(err.to_string()))?;

    sqlx::query(
        "INSERT INTO submissions (id, submission_data, created_at)
         VALUES ($1, $2, NOW())",
    )
    .bind(id)
    .bind(payload)
    .execute(pool)
    .await?;

    Ok(id)
}

pub async fn insert_profile(pool: &DbPool, profile: &StructuredProfile) -> Result<(), ApiError> {
    let riasec = serde_json::to_value(profile.riasec_scores)
        .map_err(|err| ApiError::Persistence(err.to_string()))?;
    let pwb = serde_json::to_value(profile.pwb_scores)
        .map_err(|err| ApiError::Persistence(err.to_string()))?;

    sqlx::query(
        "INSERT INTO processed_profiles
         (id, submission_id, aspirations, portfolio_text, riasec_scores, pwb_scores,
          dominant_riasec, dominant_pwb, analyzed_summary, created_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, NOW())",
    )
    .bind(profile.id)
    .bind(profile.submission_id)
    .bind(&profile.aspirations)
    .bind(&profile.portfolio_text)
    .bind(riasec)
    .bind(pwb)
    .bind(&profile.dominant_riasec)
    .bind(&profile.dominant_pwb)
    .bind(&profile.analyzed_summary)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn insert_idp_record(
    pool: &DbPool,
    profile_id: Uuid,
    json_content: &serde_json::Value,
    html_content: &str,
) -> Result<Uuid, ApiError> {
    let id = Uuid::new_v4();

    sqlx::query(
        "INSERT INTO idp_records
         (id, profile_id, json_content, html_content, status, created_at)
         VALUES ($1, $2, $3, $4, 'complete', NOW())",
    )
    .bind(id)
    .bind(profile_id)
    .bind(json_content)
    .bind(html_content)
    .execute(pool)
    .await?;

    Ok(id)
}

/// Newest IDP record for a profile, by creation time.
pub async fn latest_idp_for_profile(
    pool: &DbPool,
    profile_id: Uuid,
) -> Result<Option<IdpRecord>, ApiError> {
    let record = sqlx::query_as::<_, IdpRecord>(
        "SELECT id, profile_id, json_content, html_content, status, error_message, created_at
         FROM idp_records
         WHERE profile_id = $1
         ORDER BY created_at DESC
         LIMIT 1",
    )
    .bind(profile_id)
    .fetch_optional(pool)
    .await?;

    Ok(record)
}

/// Nearest-neighbor lookup through the `match_knowledge_chunks` stored
/// function. Ranking (descending cosine similarity) is done by the database.
pub async fn match_knowledge_chunks(
    pool: &DbPool,
    query_embedding: &[f32],
    match_threshold: f64,
    match_count: i32,
) -> Result<Vec<KnowledgeChunk>, ApiError> {
    let chunks = sqlx::query_as::<_, KnowledgeChunk>(
        "SELECT id, content_text, source_document, metadata, similarity
         FROM match_knowledge_chunks($1, $2, $3)",
    )
    .bind(Vector::from(query_embedding.to_vec()))
    .bind(match_threshold)
    .bind(match_count)
    .fetch_all(pool)
    .await?;

    Ok(chunks)
}
