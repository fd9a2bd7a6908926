//! Operator endpoints
//!
//! Guarded by a static bearer token from `[admin] token`. With no token
//! configured the guard lets every request through.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
    Json,
};
use tracing::{info, warn};

use crate::engine::RefreshSummary;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Require `Authorization: Bearer <token>` on admin routes
pub async fn admin_auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(expected) = state.admin_token.as_deref() else {
        return Ok(next.run(request).await);
    };

    let token_matches = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim() == expected);

    match token_matches {
        Some(true) => Ok(next.run(request).await),
        Some(false) => {
            warn!(path = %request.uri().path(), "Rejected admin request: wrong token");
            Err(ApiError::Unauthorized("invalid admin token".to_string()))
        }
        None => Err(ApiError::Unauthorized(
            "missing bearer token".to_string(),
        )),
    }
}

/// POST /admin/refresh
///
/// Reload the index from the store. On failure the index is left as it was.
pub async fn refresh_index(State(state): State<AppState>) -> ApiResult<Json<RefreshSummary>> {
    info!("Admin refresh requested");
    let summary = state
        .engine
        .refresh()
        .await
        .map_err(|e| ApiError::Unavailable(format!("refresh failed: {}", e)))?;
    Ok(Json(summary))
}
