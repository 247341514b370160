//! Retry policy with exponential backoff.

use std::collections::BTreeSet;
use std::time::Duration;

use crate::error::ErrorKind;

/// Status codes retried unless configured otherwise.
pub const DEFAULT_RETRY_STATUSES: [u16; 6] = [408, 429, 500, 502, 503, 504];

/// Configuration for retry behavior.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Total number of attempts for one logical request (the first try included).
    pub max_attempts: u32,
    /// Delay before the second attempt.
    pub initial_delay: Duration,
    /// Multiplier applied to the delay after every failed attempt.
    pub backoff_multiplier: f64,
    /// Upper bound for a single delay.
    pub max_delay: Duration,
    /// HTTP statuses that trigger another attempt.
    pub retry_statuses: BTreeSet<u16>,
    /// Whether timeouts and transport errors trigger another attempt.
    pub retry_on_network_error: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(1000),
            backoff_multiplier: 2.0,
            max_delay: Duration::from_secs(10),
            retry_statuses: DEFAULT_RETRY_STATUSES.into_iter().collect(),
            retry_on_network_error: true,
        }
    }
}

impl RetryConfig {
    /// Set the total number of attempts.
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Set the delay before the first retry.
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Set the backoff multiplier.
    pub fn with_backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    /// Set the maximum delay between retries.
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Replace the set of retryable statuses.
    pub fn with_retry_statuses(mut self, statuses: impl IntoIterator<Item = u16>) -> Self {
        self.retry_statuses = statuses.into_iter().collect();
        self
    }

    /// Enable or disable retries on timeouts and transport errors.
    pub fn with_retry_on_network_error(mut self, enabled: bool) -> Self {
        self.retry_on_network_error = enabled;
        self
    }

    /// A single attempt, nothing retried.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            retry_statuses: BTreeSet::new(),
            retry_on_network_error: false,
            ..Default::default()
        }
    }

    /// Effective attempt count; zero is treated as one.
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Delay slept after the given failed attempt (1-indexed).
    ///
    /// `initial_delay × backoff_multiplier^(attempt-1)`, capped at `max_delay`.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let secs = self.initial_delay.as_secs_f64() * self.backoff_multiplier.powi(exponent);

        match Duration::try_from_secs_f64(secs) {
            Ok(delay) => delay.min(self.max_delay),
            Err(_) => self.max_delay,
        }
    }

    /// Returns true if this failure class is configured to trigger another attempt.
    pub fn is_eligible(&self, kind: &ErrorKind) -> bool {
        match kind {
            ErrorKind::Network(_) | ErrorKind::Timeout { .. } => self.retry_on_network_error,
            ErrorKind::Http { status, .. } => self.retry_statuses.contains(status),
            _ => false,
        }
    }
}

/// Tracks the attempts of one logical request.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    config: RetryConfig,
    attempt: u32,
}

impl RetryPolicy {
    /// Create a new retry policy from config. The first attempt is attempt 1.
    pub fn new(config: RetryConfig) -> Self {
        Self { config, attempt: 1 }
    }

    /// Returns the current attempt number (1-indexed).
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Returns true if another attempt is allowed after the current one.
    pub fn has_attempts_remaining(&self) -> bool {
        self.attempt < self.config.attempts()
    }

    /// Decide whether to retry after a failure of the current attempt.
    ///
    /// Returns the delay to sleep and advances to the next attempt, or `None`
    /// when the failure is ineligible or attempts are used up.
    pub fn next_delay(&mut self, failure: &ErrorKind) -> Option<Duration> {
        if !self.config.is_eligible(failure) || !self.has_attempts_remaining() {
            return None;
        }

        let delay = self.config.delay_after(self.attempt);
        self.attempt += 1;
        Some(delay)
    }
}
