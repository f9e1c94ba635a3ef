//! Reconnect delay policy.

use std::time::Duration;

/// Default pause before resubscribing after a dropped subscription.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_millis(2000);

/// Fixed-interval reconnect policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectBackoff {
    delay: Duration,
}

impl ReconnectBackoff {
    pub fn fixed(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::fixed(Duration::from_millis(ms))
    }

    /// Delay before reconnect attempt `attempt` (1-based). Constant.
    pub fn delay_for(&self, _attempt: u32) -> Duration {
        self.delay
    }

    /// Sleep for the delay of `attempt`.
    pub async fn wait(&self, attempt: u32) {
        tokio::time::sleep(self.delay_for(attempt)).await;
    }
}

impl Default for ReconnectBackoff {
    fn default() -> Self {
        Self::fixed(DEFAULT_RECONNECT_DELAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_is_constant() {
        let backoff = ReconnectBackoff::default();
        assert_eq!(backoff.delay_for(1), Duration::from_secs(2));
        assert_eq!(backoff.delay_for(50), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_sleeps_for_delay() {
        let backoff = ReconnectBackoff::from_millis(750);
        let start = tokio::time::Instant::now();
        backoff.wait(1).await;
        assert!(start.elapsed() >= Duration::from_millis(750));
    }
}
