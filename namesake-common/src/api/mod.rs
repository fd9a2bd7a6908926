//! Shared HTTP API types
//!
//! Framework-free request/response bodies. The matcher service wraps these
//! with its axum handlers.

pub mod types;

pub use types::{AddNamesRequest, AddNamesResponse, MatchQuery, MatchResult, NameField, NameList};
