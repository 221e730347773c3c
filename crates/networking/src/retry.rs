//! Retry with exponential backoff
//!
//! Transient failures (transport errors, timeouts, 429 and 5xx responses)
//! are retried with exponentially growing delays; anything else is returned
//! immediately.

use crate::client::HttpError;
use backoff::{ExponentialBackoff, ExponentialBackoffBuilder};
use std::future::Future;
use std::time::Duration;

/// Configuration for retry behavior
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retries after the first attempt
    pub max_retries: usize,
    /// Initial delay between retries
    pub initial_delay: Duration,
    /// Maximum delay between retries
    pub max_delay: Duration,
    /// Backoff multiplier (e.g., 2.0 doubles every delay)
    pub backoff_multiplier: f64,
    /// Random jitter applied to each delay, between 0.0 and 1.0
    pub jitter: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
            jitter: 0.5,
        }
    }
}

impl RetryConfig {
    /// Create a new retry configuration
    pub fn new(max_retries: usize) -> Self {
        Self {
            max_retries,
            ..Default::default()
        }
    }

    /// Never retry
    pub fn disabled() -> Self {
        Self::new(0)
    }

    /// Set the initial delay
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Set the maximum delay
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Set the backoff multiplier
    pub fn with_backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    /// Set the jitter factor
    pub fn with_jitter(mut self, jitter: f64) -> Self {
        self.jitter = jitter.clamp(0.0, 1.0);
        self
    }

    /// Backoff policy for these settings
    ///
    /// The policy has no elapsed-time limit; the retry count bounds it.
    pub fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoffBuilder::new()
            .with_initial_interval(self.initial_delay)
            .with_multiplier(self.backoff_multiplier)
            .with_max_interval(self.max_delay)
            .with_randomization_factor(self.jitter)
            .with_max_elapsed_time(None)
            .build()
    }
}

/// Run `operation`, retrying transient failures
///
/// # Examples
/// ```
/// use networking::client::HttpError;
/// use networking::retry::{retry, RetryConfig};
///
/// async fn example() -> Result<String, HttpError> {
///     retry(&RetryConfig::new(2), || async {
///         // Your request here
///         Ok("success".to_string())
///     })
///     .await
/// }
/// ```
pub async fn retry<F, Fut, T>(config: &RetryConfig, mut operation: F) -> Result<T, HttpError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, HttpError>>,
{
    let max_retries = config.max_retries;
    let mut attempts = 0usize;

    backoff::future::retry(config.backoff(), || {
        attempts += 1;
        let attempt = attempts;
        let request = operation();
        async move {
            request.await.map_err(|e| {
                if e.is_transient() && attempt <= max_retries {
                    tracing::warn!("Request failed (attempt {}), retrying: {}", attempt, e);
                    backoff::Error::transient(e)
                } else {
                    backoff::Error::permanent(e)
                }
            })
        }
    })
    .await
}
