//! Per-source retry policy with exponential backoff.

use std::time::Duration;

use crate::constants::{DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY_BASE_SECS};

/// Retry budget for one source's scrape-and-ingest attempt.
///
/// Attempt `n` (1-based) that fails waits `delay_base^n` seconds before the
/// next try; a source exhausting all attempts is recorded as failed and the
/// orchestrator moves on.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay_base_secs: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_RETRIES,
            delay_base_secs: DEFAULT_RETRY_DELAY_BASE_SECS,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay_base_secs: u64) -> Self {
        Self {
            max_attempts,
            delay_base_secs,
        }
    }

    /// Backoff to sleep after a failed attempt (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        Duration::from_secs(self.delay_base_secs.saturating_pow(attempt))
    }

    pub fn has_next(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_is_exponential() {
        let policy = RetryPolicy::new(3, 2);
        assert_eq!(policy.delay_for(1), Duration::from_secs(2));
        assert_eq!(policy.delay_for(2), Duration::from_secs(4));
        assert_eq!(policy.delay_for(3), Duration::from_secs(8));
    }

    #[test]
    fn attempt_budget() {
        let policy = RetryPolicy::new(3, 2);
        assert!(policy.has_next(1));
        assert!(policy.has_next(2));
        assert!(!policy.has_next(3));
    }

    #[test]
    fn huge_exponents_saturate() {
        let policy = RetryPolicy::new(100, 10);
        // Must not panic on overflow.
        let _ = policy.delay_for(99);
    }
}
