use std::convert::Infallible;
use std::sync::Arc;

use warp::{Filter, Rejection, Reply};

use crate::ai::manager::AiManager;
use crate::ai::rag::Retriever;
use crate::cache::MemoryCache;
use crate::db::DbPool;
use crate::middleware;
use crate::models::IdpRecord;

mod assessment;
mod idp;

/// Composition root state shared by the handlers. Built once at startup; the
/// AI manager inside carries the process-wide circuit breakers.
pub struct AppState {
    pub db_pool: DbPool,
    pub ai: Arc<AiManager>,
    pub retriever: Arc<Retriever>,
    pub idp_cache: Arc<MemoryCache<IdpRecord>>,
}

pub fn routes(
    state: Arc<AppState>,
    api_token: Option<String>,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    let api = warp::path("api")
        .and(warp::path("v1"))
        .and(middleware::require_bearer(api_token));

    let assessment_route = api
        .clone()
        .and(warp::path("assessment"))
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::json())
        .and(with_state(state.clone()))
        .and_then(assessment::handle_submit);

    let latest_idp_route = api
        .and(warp::path("idp"))
        .and(warp::path("latest"))
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::query())
        .and(with_state(state))
        .and_then(idp::handle_latest);

    assessment_route.or(latest_idp_route)
}

fn with_state(
    state: Arc<AppState>,
) -> impl Filter<Extract = (Arc<AppState>,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}
