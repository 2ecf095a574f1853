//! Cache invalidation trigger.
//!
//! Every blog write calls [`CacheTrigger::blog_changed`] after it commits.
//! The sweep deletes the entity's detail entry, then every list key in the
//! registry, then the registry itself. Failures are logged per key and the
//! sweep keeps going; callers never see an error.

use std::sync::Arc;

use metrics::counter;
use tracing::{debug, warn};
use uuid::Uuid;

use super::config::CacheConfig;
use super::error::CacheError;
use super::keys::{CacheKey, blog_detail_key};
use super::registry::KeyRegistry;
use super::store::CacheStore;

const METRIC_INVALIDATION: &str = "pinkdreams_cache_invalidation_total";
const METRIC_INVALIDATION_FAILED_KEYS: &str = "pinkdreams_cache_invalidation_failed_keys_total";

#[derive(Clone)]
pub struct CacheTrigger {
    config: CacheConfig,
    store: Arc<dyn CacheStore>,
    registry: KeyRegistry,
}

impl CacheTrigger {
    pub fn new(config: CacheConfig, store: Arc<dyn CacheStore>, registry: KeyRegistry) -> Self {
        Self {
            config,
            store,
            registry,
        }
    }

    /// Invalidate everything derived from blog `id`.
    pub async fn blog_changed(&self, id: Uuid) {
        self.invalidate(&blog_detail_key(id)).await;
    }

    /// Drop `detail` and every registered list key. Idempotent.
    pub async fn invalidate(&self, detail: &CacheKey) {
        if !self.config.is_enabled() {
            debug!(key = %detail, "Cache invalidation skipped: cache disabled");
            return;
        }

        counter!(METRIC_INVALIDATION).increment(1);

        if let Err(err) = self.store.delete(detail.as_str()).await {
            warn!(key = %detail, error = %err, "Failed to delete detail cache entry");
            counter!(METRIC_INVALIDATION_FAILED_KEYS).increment(1);
        }

        match self.sweep_lists().await {
            Ok(swept) => {
                debug!(
                    key = %detail,
                    swept,
                    registry = self.registry.name(),
                    "Cache invalidation complete"
                );
            }
            Err(err) => {
                warn!(
                    key = %detail,
                    registry = self.registry.name(),
                    error = %err,
                    "Cache invalidation incomplete"
                );
            }
        }
    }

    /// Delete every registered list key, then the registry.
    ///
    /// Returns the number of keys deleted. When individual deletes fail the
    /// registry is still cleared; the leftovers expire on their TTL.
    async fn sweep_lists(&self) -> Result<usize, CacheError> {
        let members = self.registry.members().await?;
        let total = members.len();
        let mut failed = 0_usize;

        for key in &members {
            if let Err(err) = self.store.delete(key).await {
                failed += 1;
                warn!(key = %key, error = %err, "Failed to delete list cache entry");
                counter!(METRIC_INVALIDATION_FAILED_KEYS).increment(1);
            }
        }

        self.registry.clear().await?;

        if failed > 0 {
            return Err(CacheError::InvalidationPartialFailure { failed, total });
        }
        Ok(total)
    }
}
