//! Persistence gateway for the name corpus
//!
//! The durable corpus is four hash namespaces, each mapping a name (field) to
//! its colon-joined phonetic code (value). The engine only ever reads a whole
//! namespace or sets a single field.

mod memory;
mod sqlite;

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use namesake_common::Environment;
use thiserror::Error;

use crate::index::Category;

pub use memory::MemoryNameStore;
pub use sqlite::SqliteNameStore;

/// Persistence gateway errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Store unreachable or not initialised
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Store round trip exceeded the configured bound
    #[error("Store {operation} timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    /// Store refused the write
    #[error("Store rejected write: {0}")]
    Rejected(String),

    /// SQLite error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// One of the four durable hash namespaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    FirstNames,
    LastNames,
    FirstNamesDev,
    LastNamesDev,
}

impl Namespace {
    pub const ALL: [Namespace; 4] = [
        Namespace::FirstNames,
        Namespace::LastNames,
        Namespace::FirstNamesDev,
        Namespace::LastNamesDev,
    ];

    /// Namespace backing the bucket for `category` in `environment`
    pub fn for_bucket(category: Category, environment: Environment) -> Self {
        match (category, environment) {
            (Category::First, Environment::Production) => Namespace::FirstNames,
            (Category::Last, Environment::Production) => Namespace::LastNames,
            (Category::First, Environment::Development) => Namespace::FirstNamesDev,
            (Category::Last, Environment::Development) => Namespace::LastNamesDev,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Namespace::FirstNames => "firstNames",
            Namespace::LastNames => "lastNames",
            Namespace::FirstNamesDev => "firstNamesDev",
            Namespace::LastNamesDev => "lastNamesDev",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key-value hash store holding the durable corpus
#[async_trait]
pub trait NameStore: Send + Sync {
    /// All fields of `namespace`; a namespace never written reads as empty
    async fn read_all(&self, namespace: Namespace) -> Result<HashMap<String, String>, StoreError>;

    /// Insert or overwrite one field
    async fn set_field(&self, namespace: Namespace, name: &str, value: &str) -> Result<(), StoreError>;

    /// Release connections; further calls may fail
    async fn close(&self) {}
}
