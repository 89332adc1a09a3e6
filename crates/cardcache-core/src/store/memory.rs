//! In-memory cache storage, the default for tests and embedding.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{CacheStorage, CacheStore};
use crate::http::{Request, Response};

#[derive(Default)]
pub struct MemoryCaches {
    stores: RwLock<HashMap<String, Arc<MemoryStore>>>,
}

impl MemoryCaches {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStorage for MemoryCaches {
    async fn open(&self, name: &str) -> Result<Arc<dyn CacheStore>> {
        let mut stores = self.stores.write().await;
        let store = stores
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(MemoryStore::default()))
            .clone();
        Ok(store)
    }

    async fn keys(&self) -> Result<Vec<String>> {
        Ok(self.stores.read().await.keys().cloned().collect())
    }

    async fn delete(&self, name: &str) -> Result<bool> {
        Ok(self.stores.write().await.remove(name).is_some())
    }
}

#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Response>>,
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn match_request(&self, request: &Request) -> Result<Option<Response>> {
        Ok(self.entries.read().await.get(&request.url).cloned())
    }

    async fn put(&self, request: &Request, response: Response) -> Result<()> {
        self.entries
            .write()
            .await
            .insert(request.url.clone(), response);
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
