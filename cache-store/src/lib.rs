//! Persistence of the last idea batch and the platform configuration.
//!
//! Two independent resources live under fixed keys. Every save replaces the
//! previous value; there is no merging or versioning. Reads never fail: a
//! missing or unreadable payload degrades to the default value.

use async_trait::async_trait;
use ideascout_core::{AppConfig, CacheError, CoreResult, ErrorExt, IdeaRecord};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

mod memory;
mod sqlite;


pub use memory::MemoryCacheStore;
pub use sqlite::SqliteCacheStore;

pub const CONFIG_KEY: &str = "app_config";
pub const IDEAS_KEY: &str = "ideas";

#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get_raw(&self, key: &str) -> CoreResult<Option<String>>;

    async fn set_raw(&self, key: &str, value: String) -> CoreResult<()>;

    /// Stored configuration, or every platform disabled.
    async fn load_config(&self) -> AppConfig {
        load_or_default(self, CONFIG_KEY).await
    }

    async fn save_config(&self, config: &AppConfig) -> CoreResult<()> {
        store(self, CONFIG_KEY, config).await?;
        info!(
            "Saved configuration ({} platforms enabled)",
            config.enabled_platforms().len()
        );
        Ok(())
    }

    /// Stored ideas, or an empty list when nothing (readable) is stored.
    async fn load_ideas(&self) -> Vec<IdeaRecord> {
        load_or_default(self, IDEAS_KEY).await
    }

    async fn save_ideas(&self, ideas: &[IdeaRecord]) -> CoreResult<()> {
        store(self, IDEAS_KEY, &ideas).await?;
        info!("Cached {} ideas", ideas.len());
        Ok(())
    }
}

async fn load_or_default<S, T>(store: &S, key: &str) -> T
where
    S: CacheStore + ?Sized,
    T: DeserializeOwned + Default,
{
    let raw = match store.get_raw(key).await {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            debug!("Nothing cached under {}", key);
            return T::default();
        }
        Err(e) => {
            e.log_warn();
            return T::default();
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(e) => {
            let corrupt = CacheError::CorruptPayload {
                key: key.to_string(),
                details: e.to_string(),
            };
            warn!("Ignoring cached value: {}", corrupt);
            T::default()
        }
    }
}

async fn store<S, T>(store: &S, key: &str, value: &T) -> CoreResult<()>
where
    S: CacheStore + ?Sized,
    T: Serialize + ?Sized,
{
    let raw = serde_json::to_string(value)?;
    store.set_raw(key, raw).await
}
