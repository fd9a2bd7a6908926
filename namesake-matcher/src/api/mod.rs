//! HTTP API handlers for namesake-matcher

pub mod admin;
pub mod health;
pub mod matching;
pub mod names;

pub use admin::{admin_auth_middleware, refresh_index};
pub use health::health_routes;
pub use matching::{match_batch, match_legacy, readiness_middleware};
pub use names::add_names;
