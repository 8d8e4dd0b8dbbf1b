use crate::CacheStore;
use async_trait::async_trait;
use ideascout_core::CoreResult;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Process-local store, used in tests and when no database is configured.
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get_raw(&self, key: &str) -> CoreResult<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set_raw(&self, key: &str, value: String) -> CoreResult<()> {
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }
}
