//! Courtesy rate limiter for the external artist source
//!
//! One instance per external origin. The check-sleep-stamp sequence runs
//! while holding the lock, so concurrent callers queue up and the origin
//! never sees two requests closer than the configured interval.

use nerdchat_common::config::DEFAULT_REQUESTS_PER_MINUTE;
use std::num::NonZeroU32;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

/// Minimum-spacing rate limiter
#[derive(Debug)]
pub struct RateLimiter {
    last_request: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RateLimiter {
    /// Spacing of `60 / requests_per_minute` seconds
    pub fn new(requests_per_minute: NonZeroU32) -> Self {
        Self::from_interval(Duration::from_secs(60) / requests_per_minute.get())
    }

    pub fn from_interval(min_interval: Duration) -> Self {
        Self {
            last_request: Mutex::new(None),
            min_interval,
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Wait if necessary to comply with the rate limit
    ///
    /// The first call returns immediately. Call exactly once per outbound
    /// request, right before sending it, whether or not the request succeeds.
    pub async fn wait_if_needed(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.min_interval {
                let wait_time = self.min_interval - elapsed;
                debug!(wait_ms = wait_time.as_millis() as u64, "Rate limiting: waiting");
                tokio::time::sleep(wait_time).await;
            }
        }

        *last = Some(Instant::now());
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::from_interval(Duration::from_secs(60) / DEFAULT_REQUESTS_PER_MINUTE)
    }
}
