//! Cache configuration.

use std::time::Duration;

const DEFAULT_LIST_TTL_SECS: u64 = 120;
const DEFAULT_DETAIL_TTL_SECS: u64 = 600;
const DEFAULT_REGISTRY_KEY: &str = "cache:keys";
const DEFAULT_RESPONSE_TIMEOUT_MS: u64 = 250;

/// Runtime cache behaviour, derived from the `[cache]` settings section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// When false every read computes and every invalidation is a no-op.
    pub enabled: bool,
    /// TTL for list entries, in seconds. Zero persists until invalidated.
    pub list_ttl_secs: u64,
    /// TTL for detail entries, in seconds.
    pub detail_ttl_secs: u64,
    /// Name of the store-side set that tracks issued list keys.
    pub registry_key: String,
    /// Upper bound on a single store round trip.
    pub response_timeout_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            list_ttl_secs: DEFAULT_LIST_TTL_SECS,
            detail_ttl_secs: DEFAULT_DETAIL_TTL_SECS,
            registry_key: DEFAULT_REGISTRY_KEY.to_string(),
            response_timeout_ms: DEFAULT_RESPONSE_TIMEOUT_MS,
        }
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            enabled: settings.enabled,
            list_ttl_secs: settings.list_ttl_secs,
            detail_ttl_secs: settings.detail_ttl_secs,
            registry_key: settings.registry_key.clone(),
            response_timeout_ms: settings.response_timeout_ms.get(),
        }
    }
}

impl CacheConfig {
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn response_timeout(&self) -> Duration {
        Duration::from_millis(self.response_timeout_ms)
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let config = CacheConfig::default();
        assert!(config.is_enabled());
        assert_eq!(config.list_ttl_secs, 120);
        assert_eq!(config.detail_ttl_secs, 600);
        assert_eq!(config.registry_key, "cache:keys");
        assert_eq!(config.response_timeout(), Duration::from_millis(250));
    }

    #[test]
    fn disabled_keeps_other_defaults() {
        let config = CacheConfig::disabled();
        assert!(!config.is_enabled());
        assert_eq!(config.list_ttl_secs, 120);
    }
}
