use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Sliding-window limiter keyed by client and route.
#[derive(Debug, Clone)]
pub struct FormRateLimiter {
    window: Duration,
    max_requests: u32,
    buckets: Arc<DashMap<String, Vec<Instant>>>,
}

impl FormRateLimiter {
    pub fn new(window: Duration, max_requests: u32) -> Self {
        Self {
            window,
            max_requests,
            buckets: Arc::new(DashMap::new()),
        }
    }

    pub fn allow(&self, client: &str, route: &str) -> bool {
        self.allow_at(client, route, Instant::now())
    }

    fn allow_at(&self, client: &str, route: &str, now: Instant) -> bool {
        let bucket_key = format!("{client}:{route}");
        let window = self.window;

        let mut entry = self.buckets.entry(bucket_key).or_default();
        entry.retain(|instant| now.duration_since(*instant) < window);

        if entry.len() >= self.max_requests as usize {
            return false;
        }

        entry.push(now);
        true
    }

    /// Drop buckets whose requests have all left the window.
    pub fn prune(&self) {
        let now = Instant::now();
        let window = self.window;
        self.buckets.retain(|_, hits| {
            hits.retain(|instant| now.duration_since(*instant) < window);
            !hits.is_empty()
        });
    }

    pub fn retry_after_secs(&self) -> u64 {
        self.window.as_secs().max(1)
    }

    pub fn limit(&self) -> u32 {
        self.max_requests
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_requests_beyond_the_ceiling() {
        let limiter = FormRateLimiter::new(Duration::from_secs(60), 2);
        let now = Instant::now();
        assert!(limiter.allow_at("1.2.3.4", "/contact/submit", now));
        assert!(limiter.allow_at("1.2.3.4", "/contact/submit", now));
        assert!(!limiter.allow_at("1.2.3.4", "/contact/submit", now));
        assert!(limiter.allow_at("1.2.3.4", "/newsletter/subscribe", now));
        assert!(limiter.allow_at("5.6.7.8", "/contact/submit", now));
    }

    #[test]
    fn window_expiry_frees_capacity() {
        let limiter = FormRateLimiter::new(Duration::from_secs(60), 1);
        let start = Instant::now();
        assert!(limiter.allow_at("ip", "/r", start));
        assert!(!limiter.allow_at("ip", "/r", start + Duration::from_secs(59)));
        assert!(limiter.allow_at("ip", "/r", start + Duration::from_secs(61)));
    }
}
