//! Rate limit port. Consulted by the HTTP layer before write endpoints run.

use std::net::IpAddr;
use std::time::Duration;

/// Outcome of a [`RateLimitPort::check`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitDecision {
    /// The request may proceed immediately.
    Allow,
    /// The client is over budget.
    Reject(RetryDirective),
}

/// Tells a rejected client when to come back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryDirective {
    pub retry_after: Duration,
}

impl RetryDirective {
    /// `retry_after` rounded up to whole seconds, never 0 (for `Retry-After`).
    pub fn retry_after_secs(&self) -> u64 {
        let secs = self.retry_after.as_secs();
        if self.retry_after.subsec_nanos() > 0 || secs == 0 {
            secs + 1
        } else {
            secs
        }
    }
}

/// Per-client request budget keyed by network address.
#[async_trait::async_trait]
pub trait RateLimitPort: Send + Sync {
    /// Record one request from `key` and decide whether it may proceed.
    async fn check(&self, key: IpAddr) -> RateLimitDecision;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_after_secs_rounds_up() {
        let d = |ms| RetryDirective {
            retry_after: Duration::from_millis(ms),
        };
        assert_eq!(d(0).retry_after_secs(), 1);
        assert_eq!(d(1).retry_after_secs(), 1);
        assert_eq!(d(1000).retry_after_secs(), 1);
        assert_eq!(d(1001).retry_after_secs(), 2);
        assert_eq!(d(59_999).retry_after_secs(), 60);
    }
}
