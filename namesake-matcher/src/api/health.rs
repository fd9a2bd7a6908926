//! Health check endpoint

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::index::CorpusSizes;
use crate::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub module: String,
    pub version: String,
    pub environment: String,
    /// Initial corpus load finished
    pub ready: bool,
    /// Entry counts of the active buckets
    pub names: CorpusSizes,
}

/// GET /health
///
/// Never gated on readiness or auth, so monitors can watch startup.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let ready = state.engine.is_ready();
    Json(HealthResponse {
        status: if ready { "ok" } else { "starting" }.to_string(),
        module: "namesake-matcher".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        environment: state.environment.to_string(),
        ready,
        names: state.engine.corpus_sizes(state.environment).await,
    })
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
