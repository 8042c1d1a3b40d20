//! SQLite-backed key-value store
//!
//! One row per key in `artist_cache`. Suits deployments that would rather
//! keep a single file than a directory of JSON documents.

use super::store::KeyValueStore;
use crate::error::StoreResult;
use async_trait::async_trait;
use sqlx::SqlitePool;
use std::path::Path;

/// Key-value store over an `artist_cache` table
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (or create) the database file and ensure the table exists
    pub async fn open(db_path: &Path) -> StoreResult<Self> {
        if let Some(parent) = db_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        // mode=rwc: read, write, create
        let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
        tracing::debug!("Connecting to cache database: {}", db_url);

        let pool = SqlitePool::connect(&db_url).await?;
        Self::from_pool(pool).await
    }

    /// Use an existing pool, creating the table if needed
    pub async fn from_pool(pool: SqlitePool) -> StoreResult<Self> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS artist_cache (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM artist_cache WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|(value,)| value))
    }

    async fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO artist_cache (key, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(nerdchat_common::time::now().to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn exists(&self, key: &str) -> StoreResult<bool> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM artist_cache WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }
}
