//! # namesake Common Library
//!
//! Shared code for the namesake services:
//! - Error type and result alias
//! - Bootstrap configuration (TOML, environment variables, CLI overrides)
//! - Tracing subscriber setup
//! - API request/response types

pub mod api;
pub mod config;
pub mod error;
pub mod logging;

pub use config::Environment;
pub use error::{Error, Result};
