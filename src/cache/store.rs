//! Key-value cache store abstraction.

use async_trait::async_trait;

use super::error::CacheError;

/// String-to-string store with per-entry TTL and named sets.
///
/// Production uses Redis; [`super::MemoryCacheStore`] gives the same
/// semantics in-process. Every method may fail with
/// [`CacheError::Unavailable`]; callers treat that as a soft failure.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Store `value` under `key`. A zero `ttl_secs` persists until deleted.
    async fn set(&self, key: &str, value: String, ttl_secs: u64) -> Result<(), CacheError>;

    /// Remove `key`. Deleting an absent key succeeds.
    async fn delete(&self, key: &str) -> Result<(), CacheError>;

    async fn registry_add(&self, registry: &str, key: &str) -> Result<(), CacheError>;

    async fn registry_members(&self, registry: &str) -> Result<Vec<String>, CacheError>;

    async fn registry_clear(&self, registry: &str) -> Result<(), CacheError>;

    async fn ping(&self) -> Result<(), CacheError>;
}
