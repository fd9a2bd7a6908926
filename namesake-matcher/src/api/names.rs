//! Add-names endpoint

use axum::{extract::State, Json};
use namesake_common::api::{AddNamesRequest, AddNamesResponse};
use tracing::info;

use crate::error::{ApiError, ApiResult, MatcherError};
use crate::AppState;

/// Turn an add request into (first, last) pairs
///
/// The whole request is validated before anything is added: both lists must
/// be present and of equal length, and every pair needs a non-blank first
/// and last name.
pub fn collect_name_pairs(request: AddNamesRequest) -> Result<Vec<(String, String)>, MatcherError> {
    let (first, last) = match (request.first, request.last) {
        (Some(first), Some(last)) => (first.into_vec(), last.into_vec()),
        _ => return Err(MatcherError::Validation("no names".to_string())),
    };

    if first.len() != last.len() {
        return Err(MatcherError::Validation(format!(
            "unpaired first/last ({} first names, {} last names)",
            first.len(),
            last.len()
        )));
    }

    let pairs: Vec<(String, String)> = first.into_iter().zip(last).collect();
    if let Some(index) = pairs
        .iter()
        .position(|(f, l)| f.trim().is_empty() || l.trim().is_empty())
    {
        return Err(MatcherError::Validation(format!(
            "empty name in pair {}",
            index
        )));
    }

    Ok(pairs)
}

/// POST /
///
/// Pairs are added in order; the first failing pair stops the request and is
/// reported with its index and the failing field. Earlier pairs stay added.
pub async fn add_names(
    State(state): State<AppState>,
    Json(request): Json<AddNamesRequest>,
) -> ApiResult<Json<AddNamesResponse>> {
    let pairs = collect_name_pairs(request).map_err(ApiError::from)?;

    for (index, (first, last)) in pairs.iter().enumerate() {
        state
            .engine
            .add_name(state.environment, first, last)
            .await
            .map_err(|e| ApiError::from_add(index, e))?;
    }

    info!(added = pairs.len(), environment = %state.environment, "Names added");
    Ok(Json(AddNamesResponse::success(pairs.len())))
}
