//! Retry policy for transport attempts.
//!
//! An attempt is retried when the call itself failed or when the provider answered
//! with a transient status (0 or 5xx). The delay between attempts is fixed.

use super::HttpResponse;
use crate::transport::TransportError;
use crate::Result;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

pub const DEFAULT_RETRY_TIMES: u32 = 5;
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::ZERO;

/// Bytes read from a discarded response before its connection is released.
pub const RESPONSE_DRAIN_LIMIT: usize = 4096;

/// Status 0 (no response) and every 5xx are transient.
pub fn is_retryable_status(status: u16) -> bool {
    status == 0 || status >= 500
}

/// Bounded retry with a fixed interval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Zero is treated as one.
    pub max_retry_times: u32,
    pub retry_interval: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retry_times: DEFAULT_RETRY_TIMES,
            retry_interval: DEFAULT_RETRY_INTERVAL,
        }
    }
}

impl RetryPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_retry_times(mut self, times: u32) -> Self {
        self.max_retry_times = times;
        self
    }

    pub fn with_retry_interval(mut self, interval: Duration) -> Self {
        self.retry_interval = interval;
        self
    }

    /// A policy that makes exactly one attempt.
    pub fn disabled() -> Self {
        Self {
            max_retry_times: 1,
            retry_interval: Duration::ZERO,
        }
    }

    /// Run `attempt` until it yields a non-retryable outcome, the attempt bound is hit,
    /// or `cancel` fires between attempts.
    ///
    /// `attempt` receives the 1-based attempt number. Whatever the last attempt produced
    /// is returned as is. A retryable response that may be replaced is drained before
    /// the cancellation check and the pause; a drain failure ends the loop with that error.
    pub async fn execute<F, Fut>(&self, cancel: &CancellationToken, mut attempt: F) -> Result<HttpResponse>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<HttpResponse>>,
    {
        if cancel.is_cancelled() {
            return Err(TransportError::Cancelled.into());
        }

        let max_attempts = self.max_retry_times.max(1);
        let mut attempt_no = 0u32;
        loop {
            attempt_no += 1;
            let mut outcome = attempt(attempt_no).await;

            let retryable = match &outcome {
                Ok(resp) => resp.is_retryable(),
                Err(_) => true,
            };
            if !retryable {
                return outcome;
            }
            if attempt_no >= max_attempts {
                warn!(
                    attempts = attempt_no,
                    status = outcome.as_ref().map(|r| r.status()).ok(),
                    "retry budget exhausted"
                );
                return outcome;
            }

            outcome = match outcome {
                Ok(resp) => {
                    debug!(attempt = attempt_no, status = resp.status(), "transient status; retrying");
                    Ok(resp.drain(RESPONSE_DRAIN_LIMIT).await?)
                }
                Err(err) => {
                    warn!(attempt = attempt_no, error = %err, "attempt failed; retrying");
                    Err(err)
                }
            };

            if cancel.is_cancelled() {
                debug!(attempt = attempt_no, "cancelled; not retrying");
                return outcome;
            }
            if !self.pause(cancel).await {
                debug!(attempt = attempt_no, "cancelled while waiting to retry");
                return outcome;
            }
        }
    }

    /// Sleep for the retry interval. Returns false if cancelled first.
    async fn pause(&self, cancel: &CancellationToken) -> bool {
        if self.retry_interval.is_zero() {
            return !cancel.is_cancelled();
        }
        tokio::select! {
            _ = cancel.cancelled() => false,
            _ = tokio::time::sleep(self.retry_interval) => true,
        }
    }
}
