use std::time::Duration;

use thiserror::Error;
use tracing::error;
use warp::http::StatusCode;
use warp::{reject::Reject, Rejection, Reply};

/// Error taxonomy for the whole service. Every failure a handler can surface
/// is one of these kinds; `handle_rejection` maps them onto HTTP statuses.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("authentication required")]
    Unauthorized,

    #[error("forbidden")]
    Forbidden,

    #[error("not found: {0}")]
    NotFound(String),

    #[error("upstream request timed out after {0:?}")]
    UpstreamTimeout(Duration),

    #[error("circuit breaker open for provider '{0}'")]
    CircuitOpen(String),

    #[error("upstream provider failure: {0}")]
    Upstream(String),

    #[error("model output failed schema validation: {0}")]
    SchemaValidation(String),

    #[error("storage failure: {0}")]
    Persistence(String),

    #[error("not implemented: {0}")]
    NotImplemented(String),
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::Persistence(err.to_string())
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Upstream(err.to_string())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::UpstreamTimeout(_) | ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::CircuitOpen(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::SchemaValidation(_)
            | ApiError::Persistence(_)
            | ApiError::NotImplemented(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message returned to the client. Validation problems echo their detail
    /// (the caller needs to know which field is wrong); everything else is
    /// reduced to a sanitized sentence, with the full detail going to the
    /// server log only.
    pub fn client_message(&self) -> String {
        match self {
            ApiError::Validation(msg) => format!("validation failed: {msg}"),
            ApiError::Unauthorized => "authentication required".to_string(),
            ApiError::Forbidden => "forbidden".to_string(),
            ApiError::NotFound(what) => format!("{what} not found"),
            ApiError::UpstreamTimeout(_) => "generation service timed out".to_string(),
            ApiError::CircuitOpen(_) => {
                "generation service temporarily unavailable, try again shortly".to_string()
            }
            ApiError::Upstream(_) => "generation service failed".to_string(),
            ApiError::SchemaValidation(_) => {
                "the generated plan failed validation and was discarded".to_string()
            }
            ApiError::Persistence(_) => "storage operation failed".to_string(),
            ApiError::NotImplemented(msg) => format!("not implemented: {msg}"),
        }
    }
}

impl Reject for ApiError {}

pub async fn handle_rejection(err: Rejection) -> Result<impl Reply, Rejection> {
    if let Some(api_err) = err.find::<ApiError>() {
        error!(error = %api_err, "request rejected");

        let json = warp::reply::json(&serde_json::json!({
            "error": api_err.client_message(),
        }));
        Ok(warp::reply::with_status(json, api_err.status()))
    } else if err.find::<warp::filters::body::BodyDeserializeError>().is_some() {
        let json = warp::reply::json(&serde_json::json!({
            "error": "malformed request body",
        }));
        Ok(warp::reply::with_status(json, StatusCode::BAD_REQUEST))
    } else if err.is_not_found() {
        let json = warp::reply::json(&serde_json::json!({
            "error": "route not found",
        }));
        Ok(warp::reply::with_status(json, StatusCode::NOT_FOUND))
    } else {
        Err(err)
    }
}
