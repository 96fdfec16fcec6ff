use async_trait::async_trait;
use std::time::Duration;

/// Bounded retry schedule expressed as data, so call sites can be tested
/// without real timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    /// Base delay; the wait before attempt N+1 is `backoff * N` (linear).
    pub backoff: Duration,
}

impl RetryPolicy {
    pub const fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts,
            backoff,
        }
    }

    pub const fn no_backoff(max_attempts: u32) -> Self {
        Self::new(max_attempts, Duration::ZERO)
    }

    /// Delay to wait after a failed 1-based `attempt`, or `None` once the
    /// attempt budget is exhausted.
    pub fn delay_after(&self, attempt: u32) -> Option<Duration> {
        if attempt >= self.max_attempts {
            None
        } else {
            Some(self.backoff * attempt)
        }
    }
}

/// Injectable delay seam for retry loops.
#[async_trait]
pub trait Sleep: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Real delays via the tokio timer.
pub struct TokioSleep;

#[async_trait]
impl Sleep for TokioSleep {
    async fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}

/// No-op sleeper for tests.
pub struct NoSleep;

#[async_trait]
impl Sleep for NoSleep {
    async fn sleep(&self, _duration: Duration) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_delay_schedule() {
        let policy = RetryPolicy::new(3, Duration::from_secs(30));
        assert_eq!(policy.delay_after(1), Some(Duration::from_secs(30)));
        assert_eq!(policy.delay_after(2), Some(Duration::from_secs(60)));
        assert_eq!(policy.delay_after(3), None);
    }

    #[test]
    fn test_no_backoff_schedule() {
        let policy = RetryPolicy::no_backoff(5);
        assert_eq!(policy.delay_after(1), Some(Duration::ZERO));
        assert_eq!(policy.delay_after(4), Some(Duration::ZERO));
        assert_eq!(policy.delay_after(5), None);
    }

    #[test]
    fn test_single_attempt_never_waits() {
        let policy = RetryPolicy::no_backoff(1);
        assert_eq!(policy.delay_after(1), None);
    }
}
