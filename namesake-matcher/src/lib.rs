//! namesake-matcher library - name matching service
//!
//! Resolves candidate personal names against a known corpus using Double
//! Metaphone codes and Jaro-Winkler similarity, and keeps that corpus in a
//! write-through in-memory index backed by a persistent name store.

use std::sync::Arc;

use axum::Router;
use namesake_common::Environment;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod classifier;
pub mod engine;
pub mod error;
pub mod index;
pub mod phonetic;
pub mod similarity;
pub mod store;

pub use engine::MatchingEngine;
pub use error::{ApiError, ApiResult, MatcherError};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Matching engine (index + store)
    pub engine: Arc<MatchingEngine>,
    /// Selects the bucket pair every request operates on
    pub environment: Environment,
    /// Bearer token for admin routes; `None` disables the check
    pub admin_token: Option<Arc<str>>,
}

impl AppState {
    pub fn new(engine: Arc<MatchingEngine>, environment: Environment) -> Self {
        Self {
            engine,
            environment,
            admin_token: None,
        }
    }

    pub fn with_admin_token(mut self, token: Option<&str>) -> Self {
        self.admin_token = token.map(Arc::from);
        self
    }
}

/// Build application router
///
/// `/health` is always served. Match and add routes answer 503 until the
/// initial corpus load has finished. Admin routes require the bearer token.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{get, post};

    let corpus = Router::new()
        .route("/", post(api::add_names))
        .route("/:names", get(api::match_legacy))
        .route("/api/match", post(api::match_batch))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::readiness_middleware,
        ));

    let admin = Router::new()
        .route("/admin/refresh", post(api::refresh_index))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::admin_auth_middleware,
        ));

    Router::new()
        .merge(corpus)
        .merge(admin)
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
