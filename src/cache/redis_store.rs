//! Redis-backed cache store.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use redis::{AsyncCommands, RedisResult, aio::ConnectionManager};
use tokio::sync::OnceCell;
use tracing::{info, warn};

use super::error::CacheError;
use super::store::CacheStore;

/// Cache store talking to Redis through a multiplexed [`ConnectionManager`].
///
/// Each command is bounded by `timeout`; a slow server surfaces as
/// [`CacheError::Unavailable`] instead of stalling the request.
#[derive(Clone)]
pub struct RedisCacheStore {
    manager: ConnectionManager,
    timeout: Duration,
}

impl RedisCacheStore {
    pub async fn connect(url: &str, timeout: Duration) -> Result<Self, CacheError> {
        let client = redis::Client::open(url)
            .map_err(|err| CacheError::unavailable("connect", err.to_string()))?;

        let manager = match tokio::time::timeout(timeout, ConnectionManager::new(client)).await {
            Ok(Ok(manager)) => manager,
            Ok(Err(err)) => return Err(CacheError::unavailable("connect", err.to_string())),
            Err(_) => {
                return Err(CacheError::unavailable(
                    "connect",
                    format!("timed out after {}ms", timeout.as_millis()),
                ));
            }
        };

        info!(
            target = "pinkdreams::cache::redis",
            timeout_ms = timeout.as_millis() as u64,
            "Connected to Redis cache store"
        );

        Ok(Self { manager, timeout })
    }

    async fn run<T, Fut>(&self, op: &'static str, fut: Fut) -> Result<T, CacheError>
    where
        Fut: Future<Output = RedisResult<T>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => Err(CacheError::unavailable(op, err.to_string())),
            Err(_) => Err(CacheError::unavailable(
                op,
                format!("timed out after {}ms", self.timeout.as_millis()),
            )),
        }
    }
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.manager.clone();
        self.run("get", async move { conn.get::<_, Option<String>>(key).await })
            .await
    }

    async fn set(&self, key: &str, value: String, ttl_secs: u64) -> Result<(), CacheError> {
        let mut conn = self.manager.clone();
        if ttl_secs > 0 {
            self.run("set_ex", async move {
                conn.set_ex::<_, _, ()>(key, value, ttl_secs).await
            })
            .await
        } else {
            self.run("set", async move { conn.set::<_, _, ()>(key, value).await })
                .await
        }
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.manager.clone();
        self.run("del", async move { conn.del::<_, ()>(key).await })
            .await
    }

    async fn registry_add(&self, registry: &str, key: &str) -> Result<(), CacheError> {
        let mut conn = self.manager.clone();
        self.run("sadd", async move { conn.sadd::<_, _, ()>(registry, key).await })
            .await
    }

    async fn registry_members(&self, registry: &str) -> Result<Vec<String>, CacheError> {
        let mut conn = self.manager.clone();
        self.run("smembers", async move {
            conn.smembers::<_, Vec<String>>(registry).await
        })
        .await
    }

    async fn registry_clear(&self, registry: &str) -> Result<(), CacheError> {
        let mut conn = self.manager.clone();
        self.run("del", async move { conn.del::<_, ()>(registry).await })
            .await
    }

    async fn ping(&self) -> Result<(), CacheError> {
        let mut conn = self.manager.clone();
        let pong: String = self
            .run("ping", async move {
                redis::cmd("PING").query_async(&mut conn).await
            })
            .await?;
        if pong.eq_ignore_ascii_case("pong") {
            Ok(())
        } else {
            Err(CacheError::unavailable(
                "ping",
                format!("unexpected reply `{pong}`"),
            ))
        }
    }
}

/// Redis store whose connection is still being established.
///
/// A background task retries [`RedisCacheStore::connect`] every
/// `retry_interval` until it succeeds. Until then every operation fails with
/// [`CacheError::Unavailable`], so reads fall through to the database and
/// health reports the cache as down.
#[derive(Clone)]
pub struct ReconnectingRedisStore {
    connected: Arc<OnceCell<RedisCacheStore>>,
}

impl ReconnectingRedisStore {
    pub fn spawn(url: String, timeout: Duration, retry_interval: Duration) -> Self {
        let connected = Arc::new(OnceCell::new());
        let cell = Arc::clone(&connected);

        tokio::spawn(async move {
            let mut attempt: u64 = 0;
            loop {
                tokio::time::sleep(retry_interval).await;
                attempt += 1;
                match RedisCacheStore::connect(&url, timeout).await {
                    Ok(store) => {
                        let _ = cell.set(store);
                        info!(
                            target = "pinkdreams::cache::redis",
                            attempt,
                            "Redis cache store reconnected"
                        );
                        return;
                    }
                    Err(err) => warn!(
                        target = "pinkdreams::cache::redis",
                        attempt,
                        error = %err,
                        "Redis still unreachable; retrying"
                    ),
                }
            }
        });

        Self { connected }
    }

    pub fn is_connected(&self) -> bool {
        self.connected.initialized()
    }

    fn store(&self, op: &'static str) -> Result<&RedisCacheStore, CacheError> {
        self.connected
            .get()
            .ok_or_else(|| CacheError::unavailable(op, "not connected"))
    }
}

#[async_trait]
impl CacheStore for ReconnectingRedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        self.store("get")?.get(key).await
    }

    async fn set(&self, key: &str, value: String, ttl_secs: u64) -> Result<(), CacheError> {
        self.store("set")?.set(key, value, ttl_secs).await
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.store("del")?.delete(key).await
    }

    async fn registry_add(&self, registry: &str, key: &str) -> Result<(), CacheError> {
        self.store("sadd")?.registry_add(registry, key).await
    }

    async fn registry_members(&self, registry: &str) -> Result<Vec<String>, CacheError> {
        self.store("smembers")?.registry_members(registry).await
    }

    async fn registry_clear(&self, registry: &str) -> Result<(), CacheError> {
        self.store("del")?.registry_clear(registry).await
    }

    async fn ping(&self) -> Result<(), CacheError> {
        self.store("ping")?.ping().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Port 1 refuses connections, so the background task never succeeds.
    const UNREACHABLE_URL: &str = "redis://127.0.0.1:1/";

    #[tokio::test]
    async fn unreachable_store_fails_every_operation_until_connected() {
        let store = ReconnectingRedisStore::spawn(
            UNREACHABLE_URL.to_string(),
            Duration::from_millis(50),
            Duration::from_millis(10),
        );

        tokio::time::sleep(Duration::from_millis(100)).await;

        assert!(!store.is_connected());
        assert!(matches!(
            store.ping().await,
            Err(CacheError::Unavailable { op: "ping", .. })
        ));
        assert!(matches!(
            store.get("blog:list:page=1").await,
            Err(CacheError::Unavailable { .. })
        ));
        assert!(store.set("k", "v".to_string(), 60).await.is_err());
        assert!(store.registry_members("cache:keys").await.is_err());
    }
}
