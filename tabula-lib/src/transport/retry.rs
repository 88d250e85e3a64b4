//! Retry policy for transient transport failures.

use std::time::Duration;

use serde::Deserialize;

use crate::error::ApiError;

/// How [`HttpClient`](super::HttpClient) retries a failed request.
///
/// A failure is transient when it is a network error or timeout (with
/// `network` set) or an HTTP status listed in `statuses`. Everything else
/// fails at once. The wait before retry `n` is `backoff * 2^n`, capped at
/// `max_backoff`.
///
/// ```
/// use std::time::Duration;
/// use tabula_lib::transport::RetryConfig;
///
/// let retry = RetryConfig::default()
///     .attempts(2)
///     .backoff(Duration::from_millis(100));
/// assert_eq!(retry.delay(0), Duration::from_millis(100));
/// assert_eq!(retry.delay(3), Duration::from_millis(800));
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Retries after the first attempt.
    pub attempts: u32,
    #[serde(with = "crate::millis")]
    pub backoff: Duration,
    #[serde(with = "crate::millis")]
    pub max_backoff: Duration,
    /// HTTP statuses worth another try.
    pub statuses: Vec<u16>,
    pub network: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: 3,
            backoff: Duration::from_millis(250),
            max_backoff: Duration::from_secs(5),
            statuses: vec![429, 500, 502, 503, 504],
            network: true,
        }
    }
}

impl RetryConfig {
    /// A policy that never retries.
    pub fn disabled() -> Self {
        Self {
            attempts: 0,
            statuses: Vec::new(),
            network: false,
            ..Default::default()
        }
    }

    pub fn attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }

    pub fn backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn max_backoff(mut self, max: Duration) -> Self {
        self.max_backoff = max;
        self
    }

    pub fn statuses(mut self, statuses: impl IntoIterator<Item = u16>) -> Self {
        self.statuses = statuses.into_iter().collect();
        self
    }

    /// Whether `error` is transient under this policy.
    pub fn allows(&self, error: &ApiError) -> bool {
        if let Some(status) = error.status_code() {
            return self.statuses.contains(&status);
        }
        match error {
            ApiError::Network(_) | ApiError::Timeout(_) => self.network,
            _ => false,
        }
    }

    /// Wait before retry number `retry` (0-based).
    pub fn delay(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry);
        self.backoff.saturating_mul(factor).min(self.max_backoff)
    }
}
