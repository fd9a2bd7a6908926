//! SQLite-backed name store
//!
//! All four namespaces share one table; `(namespace, name)` is the key.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use super::{NameStore, Namespace, StoreError};

pub struct SqliteNameStore {
    pool: SqlitePool,
}

impl SqliteNameStore {
    /// Open (creating if needed) the database file at `db_path`
    pub async fn connect(db_path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    StoreError::Unavailable(format!(
                        "Failed to create database directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        // mode=rwc: read, write, create
        let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
        tracing::debug!("Connecting to database: {}", db_url);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(5))
            .connect(&db_url)
            .await?;

        Self::from_pool(pool).await
    }

    /// Private in-memory database, for tests and throwaway runs
    pub async fn in_memory() -> Result<Self, StoreError> {
        // A single connection that never expires: each connection to
        // :memory: is its own database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;

        Self::from_pool(pool).await
    }

    /// Wrap an open pool, creating the table if missing
    async fn from_pool(pool: SqlitePool) -> Result<Self, StoreError> {
        init_tables(&pool).await?;
        Ok(Self { pool })
    }
}

async fn init_tables(pool: &SqlitePool) -> Result<(), StoreError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS name_codes (
            namespace TEXT NOT NULL,
            name TEXT NOT NULL,
            codes TEXT NOT NULL,
            PRIMARY KEY (namespace, name)
        )
        "#,
    )
    .execute(pool)
    .await?;

    tracing::info!("Database tables initialized (name_codes)");
    Ok(())
}

#[async_trait]
impl NameStore for SqliteNameStore {
    async fn read_all(&self, namespace: Namespace) -> Result<HashMap<String, String>, StoreError> {
        let rows: Vec<(String, String)> =
            sqlx::query_as("SELECT name, codes FROM name_codes WHERE namespace = ?")
                .bind(namespace.as_str())
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().collect())
    }

    async fn set_field(&self, namespace: Namespace, name: &str, value: &str) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO name_codes (namespace, name, codes) VALUES (?, ?, ?)
             ON CONFLICT(namespace, name) DO UPDATE SET codes = excluded.codes",
        )
        .bind(namespace.as_str())
        .bind(name)
        .bind(value)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
