//! Retry schedule for executor attempts.

use std::time::Duration;
use tandem_core::ExecutorConfig;

/// Strategy for retrying failed attempts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryStrategy {
    /// Maximum number of attempts per backend, including the first.
    pub max_attempts: u32,
    /// Base delay between attempts.
    pub base_delay: Duration,
    /// Whether to use exponential backoff.
    pub exponential_backoff: bool,
}

impl RetryStrategy {
    /// Creates a strategy with a one second base delay.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay: Duration::from_secs(1),
            exponential_backoff: true,
        }
    }

    /// Creates the schedule described by an executor configuration.
    pub fn from_config(config: &ExecutorConfig) -> Self {
        Self::new(config.max_retries).with_base_delay(Duration::from_millis(config.retry_delay_ms))
    }

    /// Disables retries.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
            exponential_backoff: false,
        }
    }

    /// Sets the base delay.
    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    /// Enables or disables exponential backoff.
    pub fn with_exponential_backoff(mut self, enabled: bool) -> Self {
        self.exponential_backoff = enabled;
        self
    }

    /// Calculates the delay after a failed attempt (1-based).
    ///
    /// With backoff enabled this is `base * 2^(attempt - 1)`, saturating.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if !self.exponential_backoff {
            return self.base_delay;
        }

        let factor = 2u32.checked_pow(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }
}

impl Default for RetryStrategy {
    fn default() -> Self {
        Self::from_config(&ExecutorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exponential_backoff() {
        let strategy = RetryStrategy::default();

        assert_eq!(strategy.max_attempts, 3);
        assert_eq!(strategy.delay_for_attempt(1), Duration::from_secs(1));
        assert_eq!(strategy.delay_for_attempt(2), Duration::from_secs(2));
        assert_eq!(strategy.delay_for_attempt(3), Duration::from_secs(4));
        assert_eq!(strategy.delay_for_attempt(4), Duration::from_secs(8));
    }

    #[test]
    fn test_from_config_uses_millis() {
        let config = ExecutorConfig::default()
            .with_max_retries(5)
            .with_retry_delay_ms(100);
        let strategy = RetryStrategy::from_config(&config);

        assert_eq!(strategy.max_attempts, 5);
        assert_eq!(strategy.delay_for_attempt(1), Duration::from_millis(100));
        assert_eq!(strategy.delay_for_attempt(2), Duration::from_millis(200));
    }

    #[test]
    fn test_large_attempt_saturates() {
        let strategy = RetryStrategy::new(100);
        assert!(strategy.delay_for_attempt(64) >= Duration::from_secs(u64::from(u32::MAX)));
    }

    #[test]
    fn test_constant_delay() {
        let strategy = RetryStrategy::new(3)
            .with_base_delay(Duration::from_millis(250))
            .with_exponential_backoff(false);
        assert_eq!(strategy.delay_for_attempt(3), Duration::from_millis(250));
    }

    #[test]
    fn test_no_retry() {
        let strategy = RetryStrategy::no_retry();
        assert_eq!(strategy.max_attempts, 1);
        assert_eq!(strategy.delay_for_attempt(1), Duration::ZERO);
    }
}
