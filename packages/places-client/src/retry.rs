//! Retry policy with exponential backoff.
//!
//! Kept apart from the transport so the decision table can be tested without
//! any I/O: `decide` says whether attempt `n` that failed with `err` gets
//! another try, and how long to wait first.

use std::time::Duration;

use crate::error::PlacesError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Sleep for the given delay, then try again.
    Retry(Duration),
    /// Non-retryable failure; stop now.
    Abort,
    /// Retryable failure but the attempt budget is spent.
    Exhausted,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// `base * 2^attempt`, attempt counted from zero.
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(attempt.min(16)))
    }

    pub fn decide(&self, attempt: u32, err: &PlacesError) -> RetryDecision {
        if !err.is_retryable() {
            return RetryDecision::Abort;
        }
        if attempt + 1 >= self.max_attempts {
            return RetryDecision::Exhausted;
        }
        RetryDecision::Retry(self.backoff(attempt))
    }
}
