//! Read-through accessor.
//!
//! `get_or_compute` serves a cached JSON payload when one is present and
//! otherwise runs the supplied computation, stores its result and, for list
//! keys, records the key in the registry. Store failures never fail the
//! request; the computation simply runs uncached.

use std::future::Future;
use std::sync::Arc;

use metrics::counter;
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

use super::config::CacheConfig;
use super::error::CacheError;
use super::keys::CacheKey;
use super::registry::KeyRegistry;
use super::store::CacheStore;

const METRIC_CACHE_HIT: &str = "pinkdreams_cache_hit_total";
const METRIC_CACHE_MISS: &str = "pinkdreams_cache_miss_total";
const METRIC_CACHE_FAIL_OPEN: &str = "pinkdreams_cache_fail_open_total";

/// A value together with where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Cached<T> {
    pub value: T,
    pub cached: bool,
}

impl<T> Cached<T> {
    pub fn fresh(value: T) -> Self {
        Self {
            value,
            cached: false,
        }
    }
}

#[derive(Clone)]
pub struct ReadThroughCache {
    config: CacheConfig,
    store: Arc<dyn CacheStore>,
    registry: KeyRegistry,
}

impl ReadThroughCache {
    pub fn new(config: CacheConfig, store: Arc<dyn CacheStore>, registry: KeyRegistry) -> Self {
        Self {
            config,
            store,
            registry,
        }
    }

    pub fn list_ttl(&self) -> u64 {
        self.config.list_ttl_secs
    }

    pub fn detail_ttl(&self) -> u64 {
        self.config.detail_ttl_secs
    }

    /// Serve `key` from the store, or compute, store and register it.
    ///
    /// Errors from `compute` are returned untouched and nothing is written.
    pub async fn get_or_compute<T, E, F, Fut>(
        &self,
        key: &CacheKey,
        ttl_secs: u64,
        compute: F,
    ) -> Result<Cached<T>, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if !self.config.is_enabled() {
            return compute().await.map(Cached::fresh);
        }

        let kind = key.kind().as_str();

        match self.store.get(key.as_str()).await {
            Ok(Some(payload)) => match decode::<T>(&payload) {
                Ok(value) => {
                    debug!(key = %key, kind, "Cache hit");
                    counter!(METRIC_CACHE_HIT, "kind" => kind).increment(1);
                    return Ok(Cached {
                        value,
                        cached: true,
                    });
                }
                Err(err) => {
                    warn!(
                        key = %key,
                        kind,
                        error = %err,
                        "Discarding undecodable cache entry"
                    );
                    if let Err(del_err) = self.store.delete(key.as_str()).await {
                        warn!(key = %key, error = %del_err, "Failed to delete corrupt cache entry");
                    }
                }
            },
            Ok(None) => {}
            Err(err) => {
                warn!(key = %key, kind, error = %err, "Cache read failed; computing uncached");
                counter!(METRIC_CACHE_FAIL_OPEN, "op" => "get").increment(1);
            }
        }

        debug!(key = %key, kind, "Cache miss");
        counter!(METRIC_CACHE_MISS, "kind" => kind).increment(1);

        let value = compute().await?;
        self.store_value(key, ttl_secs, &value).await;
        Ok(Cached::fresh(value))
    }

    async fn store_value<T: Serialize>(&self, key: &CacheKey, ttl_secs: u64, value: &T) {
        let payload = match encode(value) {
            Ok(payload) => payload,
            Err(err) => {
                warn!(key = %key, error = %err, "Cache payload serialization failed; skipping write");
                return;
            }
        };

        if let Err(err) = self.store.set(key.as_str(), payload, ttl_secs).await {
            warn!(key = %key, error = %err, "Cache write failed; continuing uncached");
            counter!(METRIC_CACHE_FAIL_OPEN, "op" => "set").increment(1);
            return;
        }

        if key.is_list()
            && let Err(err) = self.registry.register(key).await
        {
            warn!(
                key = %key,
                registry = self.registry.name(),
                error = %err,
                "Failed to register list key; entry will live until its TTL"
            );
            counter!(METRIC_CACHE_FAIL_OPEN, "op" => "registry_add").increment(1);
        }
    }
}

fn encode<T: Serialize>(value: &T) -> Result<String, CacheError> {
    Ok(serde_json::to_string(value)?)
}

fn decode<T: DeserializeOwned>(payload: &str) -> Result<T, CacheError> {
    Ok(serde_json::from_str(payload)?)
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use uuid::Uuid;

    use super::*;
    use crate::cache::keys::{blog_detail_key, blog_list_key};
    use crate::cache::memory::MemoryCacheStore;
    use crate::application::repos::BlogListQuery;

    fn cache_with(store: Arc<MemoryCacheStore>, config: CacheConfig) -> ReadThroughCache {
        let registry = KeyRegistry::new(store.clone(), config.registry_key.clone());
        ReadThroughCache::new(config, store, registry)
    }

    #[tokio::test]
    async fn second_read_is_served_from_the_store() {
        let store = Arc::new(MemoryCacheStore::new());
        let cache = cache_with(store.clone(), CacheConfig::default());
        let key = blog_list_key(&BlogListQuery::default());
        let calls = AtomicUsize::new(0);

        for expected_cached in [false, true] {
            let result = cache
                .get_or_compute(&key, 120, || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, Infallible>(vec![1, 2, 3])
                })
                .await
                .expect("compute");
            assert_eq!(result.value, vec![1, 2, 3]);
            assert_eq!(result.cached, expected_cached);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            store.registry_members("cache:keys").await.expect("members"),
            vec![key.to_string()]
        );
    }

    #[tokio::test]
    async fn detail_keys_are_not_registered() {
        let store = Arc::new(MemoryCacheStore::new());
        let cache = cache_with(store.clone(), CacheConfig::default());
        let key = blog_detail_key(Uuid::new_v4());

        cache
            .get_or_compute(&key, 600, || async { Ok::<_, Infallible>("post".to_string()) })
            .await
            .expect("compute");

        assert!(store.contains(key.as_str()));
        assert!(
            store
                .registry_members("cache:keys")
                .await
                .expect("members")
                .is_empty()
        );
    }

    #[tokio::test]
    async fn compute_errors_propagate_and_are_not_cached() {
        let store = Arc::new(MemoryCacheStore::new());
        let cache = cache_with(store.clone(), CacheConfig::default());
        let key = blog_detail_key(Uuid::new_v4());

        let result = cache
            .get_or_compute(&key, 600, || async { Err::<String, _>("not found") })
            .await;
        assert_eq!(result, Err("not found"));
        assert!(store.live_keys().is_empty());
    }

    #[tokio::test]
    async fn corrupt_entries_are_replaced() {
        let store = Arc::new(MemoryCacheStore::new());
        let cache = cache_with(store.clone(), CacheConfig::default());
        let key = blog_detail_key(Uuid::new_v4());
        store
            .set(key.as_str(), "{not json".to_string(), 600)
            .await
            .expect("seed");

        let result = cache
            .get_or_compute(&key, 600, || async { Ok::<_, Infallible>(42_u32) })
            .await
            .expect("compute");
        assert!(!result.cached);
        assert_eq!(
            store.get(key.as_str()).await.expect("get"),
            Some("42".to_string())
        );
    }

    #[tokio::test]
    async fn disabled_cache_always_computes() {
        let store = Arc::new(MemoryCacheStore::new());
        let cache = cache_with(store.clone(), CacheConfig::disabled());
        let key = blog_list_key(&BlogListQuery::default());

        for _ in 0..2 {
            let result = cache
                .get_or_compute(&key, 120, || async { Ok::<_, Infallible>(1_u8) })
                .await
                .expect("compute");
            assert!(!result.cached);
        }
        assert!(store.live_keys().is_empty());
    }

    #[tokio::test]
    async fn unencodable_values_are_served_but_not_stored() {
        let store = Arc::new(MemoryCacheStore::new());
        let cache = cache_with(store.clone(), CacheConfig::default());
        let key = blog_list_key(&BlogListQuery::default());
        let mut value = std::collections::HashMap::new();
        value.insert((1_u8, 2_u8), 3_u8);

        let result = cache
            .get_or_compute(&key, 120, || async { Ok::<_, Infallible>(value.clone()) })
            .await;

        assert!(matches!(
            encode(&value),
            Err(CacheError::Serialization(_))
        ));
        assert!(result.is_ok_and(|cached| !cached.cached));
        assert!(store.live_keys().is_empty());
        assert!(
            store
                .registry_members("cache:keys")
                .await
                .expect("members")
                .is_empty()
        );
    }
}
