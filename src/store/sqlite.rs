use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use tracing::debug;

use super::TokenStore;
use crate::error::ClientError;

/// Credential store backed by a single SQLite table, so a session survives
/// process restarts.
#[derive(Clone, Debug)]
pub struct SqliteTokenStore {
    db: SqlitePool,
}

impl SqliteTokenStore {
    /// Opens (or creates, with `?mode=rwc`) the database at `url` and makes
    /// sure the credentials table exists.
    pub async fn connect(url: &str) -> Result<Self, ClientError> {
        // One connection keeps `sqlite::memory:` databases coherent.
        let db = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(url)
            .await?;
        Self::from_pool(db).await
    }

    pub async fn from_pool(db: SqlitePool) -> Result<Self, ClientError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS credentials (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&db)
        .await?;
        Ok(Self { db })
    }

    /// When the entry under `key` was last written.
    pub async fn updated_at(&self, key: &str) -> Result<Option<DateTime<Utc>>, ClientError> {
        let updated_at = sqlx::query_scalar::<_, DateTime<Utc>>(
            "SELECT updated_at FROM credentials WHERE key = ?",
        )
        .bind(key)
        .fetch_optional(&self.db)
        .await?;
        Ok(updated_at)
    }
}

#[async_trait]
impl TokenStore for SqliteTokenStore {
    async fn get(&self, key: &str) -> Result<Option<String>, ClientError> {
        let value = sqlx::query_scalar::<_, String>("SELECT value FROM credentials WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.db)
            .await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), ClientError> {
        let now = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO credentials (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(now)
        .execute(&self.db)
        .await?;
        debug!("stored credential under {}", key);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), ClientError> {
        sqlx::query("DELETE FROM credentials WHERE key = ?")
            .bind(key)
            .execute(&self.db)
            .await?;
        Ok(())
    }
}
