//! Per-host pacing for outbound requests.
//!
//! The sources being mirrored run on small shared-hosting backends, so the
//! engine spaces successive requests to the same host by a minimum interval
//! instead of sprinkling ad-hoc sleeps through the adapters. The interval is
//! supplied per acquire call because different sources tolerate different
//! rates against the same host.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tokio::time::Instant;

use url::Url;

/// Per-host minimum-interval rate limiter.
///
/// Designed to be wrapped in `Arc` and shared between the metadata fetcher's
/// callers and the download engine. Host state lives in a `DashMap`; the
/// inner `Mutex` is cloned out of the map before awaiting so no map shard
/// lock is held across an await point.
#[derive(Debug)]
pub struct RateLimiter {
    disabled: bool,
    override_interval: Option<Duration>,
    hosts: DashMap<String, Arc<Mutex<Option<Instant>>>>,
}

impl RateLimiter {
    /// Creates a limiter that uses each caller's requested interval.
    #[must_use]
    pub fn new() -> Self {
        Self {
            disabled: false,
            override_interval: None,
            hosts: DashMap::new(),
        }
    }

    /// Creates a limiter that replaces every requested interval with a
    /// single fixed one.
    #[must_use]
    pub fn with_fixed_interval(interval: Duration) -> Self {
        Self {
            disabled: false,
            override_interval: Some(interval),
            hosts: DashMap::new(),
        }
    }

    /// Creates a limiter that never delays (tests, `--rate-limit 0`).
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            disabled: true,
            override_interval: None,
            hosts: DashMap::new(),
        }
    }

    /// Whether this limiter is a no-op.
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Waits until a request to `url`'s host is allowed, then records the
    /// request time. The first request to a host proceeds immediately.
    pub async fn acquire(&self, url: &str, interval: Duration) {
        if self.disabled {
            return;
        }
        let interval = self.override_interval.unwrap_or(interval);
        if interval.is_zero() {
            return;
        }

        let host = extract_host(url);
        let state = self
            .hosts
            .entry(host)
            .or_insert_with(|| Arc::new(Mutex::new(None)))
            .clone();

        let mut last_request = state.lock().await;
        if let Some(last) = *last_request {
            let elapsed = last.elapsed();
            if elapsed < interval {
                tokio::time::sleep(interval - elapsed).await;
            }
        }
        *last_request = Some(Instant::now());
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

/// Extracts the host component used as the rate-limiting key.
///
/// Unparsable URLs share one bucket; they will fail downstream anyway.
#[must_use]
pub fn extract_host(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| "unknown".to_string())
}
