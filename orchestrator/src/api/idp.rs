use std::sync::Arc;

use warp::{Rejection, Reply};

use crate::api::AppState;
use crate::db;
use crate::models::{LatestIdpQuery, LatestIdpResponse};

/// Newest IDP record for a profile, served from the TTL cache when a recent
/// lookup already hit the database.
pub async fn handle_latest(
    query: LatestIdpQuery,
    state: Arc<AppState>,
) -> Result<impl Reply, Rejection> {
    let cache_key = query.profile_id.to_string();

    if let Some(record) = state.idp_cache.get(&cache_key) {
        return Ok(warp::reply::json(&LatestIdpResponse {
            exists: true,
            record: Some(record),
        }));
    }

    let record = db::latest_idp_for_profile(&state.db_pool, query.profile_id)
        .await
        .map_err(warp::reject::custom)?;

    match record {
        Some(record) => {
            state.idp_cache.set(&cache_key, record.clone());
            Ok(warp::reply::json(&LatestIdpResponse {
                exists: true,
                record: Some(record),
            }))
        }
        None => Ok(warp::reply::json(&LatestIdpResponse {
            exists: false,
            record: None,
        })),
    }
}
