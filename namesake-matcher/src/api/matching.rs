//! Match endpoints and the readiness gate

use axum::{
    extract::{Path, Request, State},
    middleware::Next,
    response::Response,
    Json,
};
use namesake_common::api::{MatchQuery, MatchResult};
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Reject corpus traffic until the initial refresh has completed
pub async fn readiness_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if !state.engine.is_ready() {
        return Err(ApiError::Unavailable(
            "name index is still loading".to_string(),
        ));
    }
    Ok(next.run(request).await)
}

/// Parse the path form `first,last:first,last:...`
///
/// A segment without a comma is a first name with an empty last name;
/// anything after a second comma is ignored.
pub fn parse_legacy_queries(names: &str) -> Vec<MatchQuery> {
    names
        .split(':')
        .map(|pair| {
            let mut parts = pair.split(',');
            let first = parts.next().unwrap_or_default();
            let last = parts.next().unwrap_or_default();
            MatchQuery::new(first, last)
        })
        .collect()
}

/// GET /:names
pub async fn match_legacy(
    State(state): State<AppState>,
    Path(names): Path<String>,
) -> Json<Vec<MatchResult>> {
    let queries = parse_legacy_queries(&names);
    debug!(queries = queries.len(), "Legacy match request");
    Json(state.engine.match_names(state.environment, &queries).await)
}

/// POST /api/match
///
/// Body is a JSON array of `{first, last}`; results keep input order.
pub async fn match_batch(
    State(state): State<AppState>,
    Json(queries): Json<Vec<MatchQuery>>,
) -> ApiResult<Json<Vec<MatchResult>>> {
    debug!(queries = queries.len(), "Batch match request");
    Ok(Json(
        state.engine.match_names(state.environment, &queries).await,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pairs() {
        let queries = parse_legacy_queries("Rob,Jones:Ann,Lee");
        assert_eq!(
            queries,
            vec![MatchQuery::new("Rob", "Jones"), MatchQuery::new("Ann", "Lee")]
        );
    }

    #[test]
    fn test_parse_missing_last() {
        assert_eq!(parse_legacy_queries("Rob"), vec![MatchQuery::new("Rob", "")]);
        assert_eq!(parse_legacy_queries(",Lee"), vec![MatchQuery::new("", "Lee")]);
    }
}
