//! Retry budget and backoff timing.

use std::time::Duration;

/// Default number of retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default base delay for the backoff calculation.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(1000);

/// Retry configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    /// Retries allowed after the first attempt.
    pub max_retries: u32,
    /// Base delay, see [`backoff_delay`].
    pub base_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }
}

impl RetryConfig {
    /// Create a retry config.
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// A single attempt, no retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    /// Fresh per-call state for this budget.
    pub fn state(&self) -> RetryState {
        RetryState::new(self.max_retries, self.base_delay)
    }
}

/// Per-call retry bookkeeping.
///
/// `retry_count` starts at 0 and grows by one per failed attempt. The call is
/// finished once `retry_count > max_retries`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryState {
    retry_count: u32,
    max_retries: u32,
    base_delay: Duration,
}

impl RetryState {
    /// Create state for a new call.
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            retry_count: 0,
            max_retries,
            base_delay,
        }
    }

    /// Failed attempts so far.
    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    /// Retry budget.
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Base delay.
    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    /// Attempts made so far, counting the one in flight.
    pub fn attempts(&self) -> u32 {
        self.retry_count.saturating_add(1).min(self.max_retries.saturating_add(1))
    }

    /// Record a failed attempt. Returns `true` while another attempt is allowed.
    pub fn record_failure(&mut self) -> bool {
        self.retry_count = self.retry_count.saturating_add(1);
        !self.is_exhausted()
    }

    /// Whether the budget is spent.
    pub fn is_exhausted(&self) -> bool {
        self.retry_count > self.max_retries
    }

    /// Delay before the next attempt.
    pub fn next_delay(&self) -> Duration {
        backoff_delay(self.retry_count, self.base_delay)
    }
}

/// `(1 + retry_count) * 2 * base_delay`.
///
/// Linear in `retry_count`, no jitter and no cap.
pub fn backoff_delay(retry_count: u32, base_delay: Duration) -> Duration {
    base_delay.saturating_mul(retry_count.saturating_add(1).saturating_mul(2))
}

/// Sleep for [`backoff_delay`] without blocking the runtime, then return it.
pub async fn backoff(retry_count: u32, base_delay: Duration) -> Duration {
    let delay = backoff_delay(retry_count, base_delay);
    tokio::time::sleep(delay).await;
    delay
}

/// Whole milliseconds in `delay`, saturating at `u64::MAX`.
pub(crate) fn delay_millis(delay: Duration) -> u64 {
    u64::try_from(delay.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_delay_is_linear() {
        let base = Duration::from_millis(1000);
        assert_eq!(backoff_delay(0, base), Duration::from_millis(2000));
        assert_eq!(backoff_delay(1, base), Duration::from_millis(4000));
        assert_eq!(backoff_delay(2, base), Duration::from_millis(6000));
        assert_eq!(backoff_delay(3, base), Duration::from_millis(8000));
    }

    #[test]
    fn test_backoff_delay_saturates() {
        let delay = backoff_delay(u32::MAX, Duration::from_secs(u64::MAX / 2));
        assert_eq!(delay, Duration::MAX);
    }

    #[test]
    fn test_delay_millis_saturates() {
        assert_eq!(delay_millis(Duration::from_millis(4000)), 4000);
        assert_eq!(delay_millis(Duration::MAX), u64::MAX);
        assert_eq!(delay_millis(backoff_delay(u32::MAX, Duration::MAX)), u64::MAX);
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_sleeps_for_delay() {
        let start = tokio::time::Instant::now();
        let slept = backoff(1, Duration::from_millis(500)).await;

        assert_eq!(slept, Duration::from_millis(2000));
        assert!(start.elapsed() >= Duration::from_millis(2000));
    }

    #[test]
    fn test_default_config() {
        let config = RetryConfig::default();
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.base_delay, Duration::from_millis(1000));
        assert_eq!(RetryConfig::none().max_retries, 0);
    }

    #[test]
    fn test_state_allows_max_retries_plus_one_attempts() {
        let mut state = RetryConfig::default().state();
        assert_eq!(state.retry_count(), 0);
        assert_eq!(state.attempts(), 1);

        assert!(state.record_failure());
        assert!(state.record_failure());
        assert!(state.record_failure());
        assert_eq!(state.retry_count(), 3);
        assert_eq!(state.attempts(), 4);

        assert!(!state.record_failure());
        assert!(state.is_exhausted());
        assert_eq!(state.attempts(), 4);
    }

    #[test]
    fn test_state_next_delay_uses_incremented_count() {
        let mut state = RetryState::new(3, Duration::from_millis(1000));
        state.record_failure();
        assert_eq!(state.next_delay(), Duration::from_millis(4000));
        state.record_failure();
        assert_eq!(state.next_delay(), Duration::from_millis(6000));
    }
}
