//! In-process cache store.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use super::error::CacheError;
use super::lock::{rw_read, rw_write};
use super::store::CacheStore;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|deadline| deadline > now)
    }
}

/// Cache store backed by process memory.
///
/// Mirrors the Redis store: entries expire lazily on read and sets share
/// the key namespace, so `delete` on a set name drops the set.
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    entries: RwLock<HashMap<String, Entry>>,
    sets: RwLock<HashMap<String, HashSet<String>>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys holding a live value, sorted.
    pub fn live_keys(&self) -> Vec<String> {
        let now = Instant::now();
        let guard = rw_read(&self.entries, "memory.live_keys");
        let mut keys: Vec<String> = guard
            .iter()
            .filter(|(_, entry)| entry.is_live(now))
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort();
        keys
    }

    pub fn contains(&self, key: &str) -> bool {
        let now = Instant::now();
        rw_read(&self.entries, "memory.contains")
            .get(key)
            .is_some_and(|entry| entry.is_live(now))
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let now = Instant::now();
        {
            let guard = rw_read(&self.entries, "memory.get");
            match guard.get(key) {
                None => return Ok(None),
                Some(entry) if entry.is_live(now) => return Ok(Some(entry.value.clone())),
                Some(_) => {}
            }
        }

        let mut guard = rw_write(&self.entries, "memory.get.expire");
        if guard.get(key).is_some_and(|entry| !entry.is_live(now)) {
            guard.remove(key);
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: String, ttl_secs: u64) -> Result<(), CacheError> {
        let expires_at = (ttl_secs > 0).then(|| Instant::now() + Duration::from_secs(ttl_secs));
        rw_write(&self.entries, "memory.set").insert(key.to_string(), Entry { value, expires_at });
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        rw_write(&self.entries, "memory.delete").remove(key);
        rw_write(&self.sets, "memory.delete").remove(key);
        Ok(())
    }

    async fn registry_add(&self, registry: &str, key: &str) -> Result<(), CacheError> {
        rw_write(&self.sets, "memory.registry_add")
            .entry(registry.to_string())
            .or_default()
            .insert(key.to_string());
        Ok(())
    }

    async fn registry_members(&self, registry: &str) -> Result<Vec<String>, CacheError> {
        let guard = rw_read(&self.sets, "memory.registry_members");
        let mut members: Vec<String> = guard
            .get(registry)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default();
        members.sort();
        Ok(members)
    }

    async fn registry_clear(&self, registry: &str) -> Result<(), CacheError> {
        rw_write(&self.sets, "memory.registry_clear").remove(registry);
        Ok(())
    }

    async fn ping(&self) -> Result<(), CacheError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_then_get_returns_value() {
        let store = MemoryCacheStore::new();
        store.set("k", "v".to_string(), 60).await.expect("set");
        assert_eq!(store.get("k").await.expect("get"), Some("v".to_string()));
    }

    #[tokio::test]
    async fn zero_ttl_persists() {
        let store = MemoryCacheStore::new();
        store.set("k", "v".to_string(), 0).await.expect("set");
        assert!(store.contains("k"));
    }

    #[tokio::test]
    async fn expired_entries_read_as_absent() {
        let store = MemoryCacheStore::new();
        store
            .entries
            .write()
            .expect("lock")
            .insert(
                "k".to_string(),
                Entry {
                    value: "v".to_string(),
                    expires_at: Some(Instant::now() - Duration::from_secs(1)),
                },
            );
        assert_eq!(store.get("k").await.expect("get"), None);
        assert!(store.live_keys().is_empty());
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = MemoryCacheStore::new();
        store.delete("missing").await.expect("first delete");
        store.set("k", "v".to_string(), 0).await.expect("set");
        store.delete("k").await.expect("delete");
        store.delete("k").await.expect("second delete");
        assert_eq!(store.get("k").await.expect("get"), None);
    }

    #[tokio::test]
    async fn registry_is_a_set() {
        let store = MemoryCacheStore::new();
        store.registry_add("reg", "b").await.expect("add");
        store.registry_add("reg", "a").await.expect("add");
        store.registry_add("reg", "b").await.expect("add");
        assert_eq!(
            store.registry_members("reg").await.expect("members"),
            vec!["a".to_string(), "b".to_string()]
        );

        store.registry_clear("reg").await.expect("clear");
        assert!(store.registry_members("reg").await.expect("members").is_empty());
    }
}
