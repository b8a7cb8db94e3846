//! In-memory fixed-window rate limiter keyed by client IP. Implements RateLimitPort.
//!
//! Each address gets `max_requests` per `window`; the window starts at the first request.
//! State is process-local, so limits are per instance.

use crate::ports::{RateLimitDecision, RateLimitPort, RetryDirective};
use std::collections::HashMap;
use std::net::IpAddr;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

/// Expired windows are swept once the map holds this many addresses.
const PRUNE_THRESHOLD: usize = 4096;

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

pub struct FixedWindowLimiter {
    max_requests: u32,
    window: Duration,
    windows: Mutex<HashMap<IpAddr, Window>>,
}

impl FixedWindowLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests: max_requests.max(1),
            window,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Same as [`RateLimitPort::check`] with an explicit clock.
    pub async fn check_at(&self, key: IpAddr, now: Instant) -> RateLimitDecision {
        let mut windows = self.windows.lock().await;

        if windows.len() >= PRUNE_THRESHOLD {
            let window = self.window;
            windows.retain(|_, w| now.saturating_duration_since(w.started) < window);
        }

        let entry = windows.entry(key).or_insert(Window {
            started: now,
            count: 0,
        });
        let elapsed = now.saturating_duration_since(entry.started);
        if elapsed >= self.window {
            *entry = Window {
                started: now,
                count: 0,
            };
        }

        if entry.count >= self.max_requests {
            let retry_after = self
                .window
                .saturating_sub(now.saturating_duration_since(entry.started));
            debug!(%key, ?retry_after, "rate limited");
            return RateLimitDecision::Reject(RetryDirective { retry_after });
        }
        entry.count += 1;
        RateLimitDecision::Allow
    }

    /// Number of addresses currently tracked.
    pub async fn tracked(&self) -> usize {
        self.windows.lock().await.len()
    }
}

#[async_trait::async_trait]
impl RateLimitPort for FixedWindowLimiter {
    async fn check(&self, key: IpAddr) -> RateLimitDecision {
        self.check_at(key, Instant::now()).await
    }
}
