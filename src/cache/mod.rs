//! Pink Dreams response cache.
//!
//! A read-through cache over a string key-value store (Redis in
//! production, process memory in tests) with registry-based bulk
//! invalidation:
//!
//! - [`ReadThroughCache`] serves or computes list and detail payloads.
//! - [`CacheTrigger`] sweeps detail and list entries after writes.
//! - [`KeyRegistry`] is the store-side set of every issued list key.
//!
//! ```toml
//! [cache]
//! enabled = true
//! redis_url = "redis://127.0.0.1:6379"
//! list_ttl_seconds = 120
//! detail_ttl_seconds = 600
//! ```

mod accessor;
mod config;
mod error;
mod keys;
mod lock;
mod memory;
mod redis_store;
mod registry;
mod store;
mod trigger;

use std::sync::Arc;

pub use accessor::{Cached, ReadThroughCache};
pub use config::CacheConfig;
pub use error::CacheError;
pub use keys::{
    BLOG_DETAIL_PREFIX, BLOG_LIST_PREFIX, CacheKey, KeyKind, blog_detail_key, blog_list_key,
};
pub use memory::MemoryCacheStore;
pub use redis_store::{ReconnectingRedisStore, RedisCacheStore};
pub use registry::KeyRegistry;
pub use store::CacheStore;
pub use trigger::CacheTrigger;

/// Wire the accessor and trigger around one store and one registry.
pub fn build_cache(
    config: CacheConfig,
    store: Arc<dyn CacheStore>,
) -> (ReadThroughCache, CacheTrigger) {
    let registry = KeyRegistry::new(store.clone(), config.registry_key.clone());
    let reader = ReadThroughCache::new(config.clone(), store.clone(), registry.clone());
    let trigger = CacheTrigger::new(config, store, registry);
    (reader, trigger)
}
