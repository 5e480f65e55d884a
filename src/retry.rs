//! Retry classification and pacing for outbound calls
//!
//! An attempt that fails with a retryable error is followed by a pause and
//! another attempt, until the attempt budget is spent:
//!
//! - timed-out attempts wait `timeout_retry_delay`
//! - retryable statuses wait `backoff_unit * 2^i` for attempt `i`
//! - everything else is returned immediately
//!
//! Pauses go through a [`Sleeper`] so tests can observe them without waiting.

use crate::config::ExecutorConfig;
use crate::error::{Error, ExecutionError};
use async_trait::async_trait;
use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

/// Trait for errors that can be classified as retryable or not
///
/// Transient failures (timeouts, 5xx statuses) should return `true`.
/// Permanent failures (4xx statuses, malformed bodies, refused connections)
/// should return `false`.
pub trait IsRetryable {
    /// Returns true if the error is transient and the operation should be retried
    fn is_retryable(&self) -> bool;
}

impl IsRetryable for ExecutionError {
    fn is_retryable(&self) -> bool {
        match self {
            ExecutionError::Timeout { .. } | ExecutionError::ServerStatus { .. } => true,
            // the server already answered; asking again will not change it
            ExecutionError::ClientStatus { .. } | ExecutionError::InvalidBody(_) => false,
            ExecutionError::InvalidRequest(_) | ExecutionError::Transport(_) => false,
        }
    }
}

impl IsRetryable for Error {
    fn is_retryable(&self) -> bool {
        match self {
            Error::Execution(e) => e.is_retryable(),
            Error::Network(e) => e.is_timeout(),
            _ => false,
        }
    }
}

/// Source of the pauses between attempts
#[async_trait]
pub trait Sleeper: Send + Sync {
    /// Pause for `duration`
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Records requested pauses and returns at once
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    slept: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Pauses requested so far, in order
    pub fn recorded(&self) -> Vec<Duration> {
        match self.slept.lock() {
            Ok(slept) => slept.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        match self.slept.lock() {
            Ok(mut slept) => slept.push(duration),
            Err(poisoned) => poisoned.into_inner().push(duration),
        }
    }
}

/// Timeout for attempt `attempt` (0-based)
pub fn attempt_timeout(config: &ExecutorConfig, attempt: u32) -> Duration {
    config.base_timeout + config.timeout_step * attempt
}

/// Pause after attempt `attempt` (0-based) failed with `error`
pub fn retry_delay(config: &ExecutorConfig, error: &ExecutionError, attempt: u32) -> Duration {
    match error {
        ExecutionError::Timeout { .. } => config.timeout_retry_delay,
        _ => config.backoff_unit * 2u32.saturating_pow(attempt),
    }
}

/// Run `operation` until it succeeds, fails permanently, or the budget is spent
///
/// `operation` receives the 0-based attempt index. The error of the last
/// attempt is returned unchanged.
pub async fn with_retry<F, Fut, T>(
    config: &ExecutorConfig,
    sleeper: &dyn Sleeper,
    mut operation: F,
) -> Result<T, ExecutionError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, ExecutionError>>,
{
    let max_attempts = config.max_retries.max(1);
    let mut attempt = 0;

    loop {
        match operation(attempt).await {
            Ok(result) => {
                if attempt > 0 {
                    tracing::info!(attempts = attempt + 1, "request succeeded after retry");
                }
                return Ok(result);
            }
            Err(e) if e.is_retryable() && attempt + 1 < max_attempts => {
                let delay = retry_delay(config, &e, attempt);
                tracing::warn!(
                    error = %e,
                    attempt = attempt + 1,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    "attempt failed, retrying"
                );
                sleeper.sleep(delay).await;
                attempt += 1;
            }
            Err(e) => {
                if e.is_retryable() {
                    tracing::error!(error = %e, attempts = attempt + 1, "retry budget exhausted");
                } else {
                    tracing::error!(error = %e, attempts = attempt + 1, "request failed permanently");
                }
                return Err(e);
            }
        }
    }
}
