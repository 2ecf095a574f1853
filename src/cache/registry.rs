//! Store-side registry of issued list keys.
//!
//! A single set (default `cache:keys`) collects every list key the accessor
//! has written. The trigger sweeps it in one pass instead of scanning the
//! keyspace. Losing a member only means that entry lives until its TTL.

use std::sync::Arc;

use super::error::CacheError;
use super::keys::CacheKey;
use super::store::CacheStore;

#[derive(Clone)]
pub struct KeyRegistry {
    store: Arc<dyn CacheStore>,
    name: String,
}

impl KeyRegistry {
    pub fn new(store: Arc<dyn CacheStore>, name: impl Into<String>) -> Self {
        Self {
            store,
            name: name.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn register(&self, key: &CacheKey) -> Result<(), CacheError> {
        self.store.registry_add(&self.name, key.as_str()).await
    }

    pub async fn members(&self) -> Result<Vec<String>, CacheError> {
        self.store.registry_members(&self.name).await
    }

    pub async fn clear(&self) -> Result<(), CacheError> {
        self.store.registry_clear(&self.name).await
    }
}
