use warp::{Filter, Rejection};

use crate::error::ApiError;

pub fn cors() -> warp::cors::Builder {
    warp::cors()
        .allow_any_origin()
        .allow_headers(vec![
            "User-Agent",
            "Origin",
            "Content-Type",
            "Authorization",
            "Accept",
            "Content-Length",
        ])
        .allow_methods(vec!["POST", "GET", "OPTIONS"])
}

/// Static bearer-token check for the API surface. With no token configured
/// the filter passes everything through. Session handling lives elsewhere;
/// this only guards the generation endpoints against anonymous use.
pub fn require_bearer(
    token: Option<String>,
) -> impl Filter<Extract = (), Error = Rejection> + Clone {
    warp::header::optional::<String>("authorization")
        .and_then(move |header: Option<String>| {
            let expected = token.clone();
            async move {
                let Some(want) = expected else {
                    return Ok(());
                };
                match header {
                    Some(got) if got.strip_prefix("Bearer ").map(str::trim) == Some(want.as_str()) => {
                        Ok(())
                    }
                    Some(_) => Err(warp::reject::custom(ApiError::Forbidden)),
                    None => Err(warp::reject::custom(ApiError::Unauthorized)),
                }
            }
        })
        .untuple_one()
}
