use crate::CacheStore;
use async_trait::async_trait;
use ideascout_core::{CacheError, CoreResult};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use tracing::{debug, error, info};

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS cache_entries (
    key TEXT PRIMARY KEY NOT NULL,
    value TEXT NOT NULL,
    updated_at INTEGER NOT NULL
)";

const UPSERT: &str = "INSERT INTO cache_entries (key, value, updated_at) VALUES (?, ?, ?)
    ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at";

const SELECT: &str = "SELECT value FROM cache_entries WHERE key = ?";

/// Key/value table in a SQLite database.
#[derive(Debug, Clone)]
pub struct SqliteCacheStore {
    pool: SqlitePool,
}

impl SqliteCacheStore {
    /// Opens (creating if missing) the database and prepares the schema.
    pub async fn connect(database_url: &str) -> CoreResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| CacheError::ConnectionFailed {
                reason: e.to_string(),
            })?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| {
                error!("Failed to open cache database {}: {}", database_url, e);
                CacheError::ConnectionFailed {
                    reason: e.to_string(),
                }
            })?;

        let store = Self { pool };
        store.run_migrations().await?;
        info!("Opened cache database {}", database_url);
        Ok(store)
    }

    pub async fn run_migrations(&self) -> CoreResult<()> {
        sqlx::query(CREATE_TABLE)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Cache migration failed: {}", e);
                CacheError::MigrationFailed {
                    migration: "create cache_entries".to_string(),
                }
            })?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl CacheStore for SqliteCacheStore {
    async fn get_raw(&self, key: &str) -> CoreResult<Option<String>> {
        let value: Option<String> = sqlx::query_scalar(SELECT)
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(CacheError::from)?;
        debug!("Cache read {} (hit: {})", key, value.is_some());
        Ok(value)
    }

    async fn set_raw(&self, key: &str, value: String) -> CoreResult<()> {
        let updated_at = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or_default();

        sqlx::query(UPSERT)
            .bind(key)
            .bind(value)
            .bind(updated_at)
            .execute(&self.pool)
            .await
            .map_err(CacheError::from)?;
        debug!("Cache write {}", key);
        Ok(())
    }
}
