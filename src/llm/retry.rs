//! Retry schedule for transient generation failures.

use std::time::Duration;

/// A bounded retry schedule with doubling backoff.
///
/// `max_attempts` counts every try including the first; `base_delay` is
/// slept after the first failure and doubles after each subsequent one.
/// Only transient faults (HTTP 429/5xx, transport errors) consume
/// attempts; policy blocks are terminal on the first response.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts allowed, including the first.
    pub max_attempts: u32,
    /// Delay after the first failure.
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Create a policy. `max_attempts` of 0 is treated as 1; giving up
    /// before trying once is never useful.
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Backoff to sleep after the `attempt`-th failure (1-based).
    ///
    /// Doubles per failure, with the exponent capped so long outages
    /// cannot overflow into absurd delays.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(6);
        self.base_delay * 2u32.pow(exponent)
    }

    /// Whether `attempt` (1-based) was the last allowed try.
    pub fn is_last_attempt(&self, attempt: u32) -> bool {
        attempt >= self.max_attempts
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles() {
        let policy = RetryPolicy::new(3, Duration::from_millis(100));
        assert_eq!(policy.backoff(1), Duration::from_millis(100));
        assert_eq!(policy.backoff(2), Duration::from_millis(200));
        assert_eq!(policy.backoff(3), Duration::from_millis(400));
    }

    #[test]
    fn test_backoff_exponent_is_capped() {
        let policy = RetryPolicy::new(100, Duration::from_millis(100));
        assert_eq!(policy.backoff(7), policy.backoff(50));
    }

    #[test]
    fn test_last_attempt() {
        let policy = RetryPolicy::new(3, Duration::from_millis(1));
        assert!(!policy.is_last_attempt(1));
        assert!(!policy.is_last_attempt(2));
        assert!(policy.is_last_attempt(3));
    }

    #[test]
    fn test_zero_attempts_rounds_up() {
        let policy = RetryPolicy::new(0, Duration::from_millis(1));
        assert_eq!(policy.max_attempts, 1);
    }
}
