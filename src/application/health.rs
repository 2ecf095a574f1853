use std::sync::Arc;

use serde::Serialize;
use tracing::warn;

use crate::application::repos::HealthRepo;
use crate::cache::CacheStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    Up,
    Down,
    Disabled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallStatus {
    Ok,
    Degraded,
    Unavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    pub status: OverallStatus,
    pub database: ComponentStatus,
    pub cache: ComponentStatus,
}

impl HealthReport {
    /// The service is usable whenever the database answers; the cache
    /// fails open.
    pub fn is_available(&self) -> bool {
        self.database == ComponentStatus::Up
    }
}

#[derive(Clone)]
pub struct HealthService {
    database: Arc<dyn HealthRepo>,
    cache: Option<Arc<dyn CacheStore>>,
}

impl HealthService {
    pub fn new(database: Arc<dyn HealthRepo>, cache: Option<Arc<dyn CacheStore>>) -> Self {
        Self { database, cache }
    }

    pub async fn check(&self) -> HealthReport {
        let database = match self.database.ping().await {
            Ok(()) => ComponentStatus::Up,
            Err(err) => {
                warn!(target = "pinkdreams::health", error = %err, "Database health check failed");
                ComponentStatus::Down
            }
        };

        let cache = match &self.cache {
            None => ComponentStatus::Disabled,
            Some(store) => match store.ping().await {
                Ok(()) => ComponentStatus::Up,
                Err(err) => {
                    warn!(target = "pinkdreams::health", error = %err, "Cache health check failed");
                    ComponentStatus::Down
                }
            },
        };

        let status = match (database, cache) {
            (ComponentStatus::Up, ComponentStatus::Down) => OverallStatus::Degraded,
            (ComponentStatus::Up, _) => OverallStatus::Ok,
            _ => OverallStatus::Unavailable,
        };

        HealthReport {
            status,
            database,
            cache,
        }
    }
}
