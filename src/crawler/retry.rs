//! Retry scheduling for a single logical fetch
//!
//! [`run_with_retry`] drives a fetch operation until it succeeds, hits a
//! non-retryable client error, or runs out of attempts or waiting time.
//!
//! # Wait rules
//!
//! | Outcome | Action |
//! |---------|--------|
//! | Success | Return immediately |
//! | ClientError | Abort, no further attempts |
//! | TransientError | Wait `base * factor^retry`, retry |
//! | RateLimited with Retry-After | Wait `max(0, retry_after - attempt^2 ms)`, retry |
//! | RateLimited without Retry-After | Same as TransientError |
//!
//! Nothing waits after the final attempt. Every wait counts against the retry
//! window; a backoff is clamped to what is left of it, while a rate-limit wait
//! that does not fit ends the operation.

use crate::config::RetryConfig;
use crate::crawler::fetcher::FetchOutcome;
use rand::Rng;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Terminal failure of a retried fetch
///
/// These are branch-local: the crawl logs them and moves on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RetryError {
    #[error("non-retryable client error (HTTP {status_code})")]
    ClientError { status_code: u16 },

    #[error("gave up after {attempts} attempt(s): {last_error}")]
    Exhausted { attempts: u32, last_error: String },
}

/// Body of a successfully fetched page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub status_code: u16,
    pub body: String,
    /// Attempts it took, including the successful one
    pub attempts: u32,
}

/// How many times to try and how long to wait in between
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub factor: u32,
    pub max_retry_time: Duration,
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay: Duration::from_millis(config.base_delay_ms),
            factor: config.factor.max(1),
            max_retry_time: Duration::from_millis(config.max_retry_time_ms),
            jitter: config.jitter,
        }
    }
}

impl RetryPolicy {
    /// Exponential backoff before retry number `retry` (0-based), without jitter
    pub fn backoff_delay(&self, retry: u32) -> Duration {
        let multiplier = self.factor.saturating_pow(retry.min(32));
        self.base_delay.saturating_mul(multiplier)
    }

    /// Wait after a rate-limited attempt that carried a `Retry-After`
    ///
    /// `attempt` is the 1-based number of the attempt that was rate limited.
    /// The result is never negative.
    pub fn rate_limit_delay(retry_after: Duration, attempt: u32) -> Duration {
        let offset = u64::from(attempt).saturating_mul(u64::from(attempt));
        retry_after.saturating_sub(Duration::from_millis(offset))
    }

    fn jittered(&self, delay: Duration) -> Duration {
        if !self.jitter || delay.is_zero() {
            return delay;
        }
        let max_jitter_ms = (delay.as_millis() / 10) as u64;
        let extra = rand::thread_rng().gen_range(0..=max_jitter_ms);
        delay + Duration::from_millis(extra)
    }
}

/// Progress of one logical fetch across its attempts
#[derive(Debug, Default)]
pub struct RetryState {
    /// Number of the attempt currently running (1-based), 0 before the first
    pub attempt: u32,
    /// Time spent sleeping between attempts
    pub total_wait: Duration,
}

impl RetryState {
    fn remaining_window(&self, policy: &RetryPolicy) -> Duration {
        policy.max_retry_time.saturating_sub(self.total_wait)
    }
}

/// Runs `operation` under `policy` until it settles
///
/// # Returns
///
/// * `Ok(FetchedPage)` - An attempt succeeded
/// * `Err(RetryError::ClientError)` - A non-retryable client error; no more attempts were made
/// * `Err(RetryError::Exhausted)` - Attempts or retry window ran out
pub async fn run_with_retry<F, Fut>(
    policy: &RetryPolicy,
    mut operation: F,
) -> Result<FetchedPage, RetryError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = FetchOutcome>,
{
    let mut state = RetryState::default();

    loop {
        state.attempt += 1;
        let attempt = state.attempt;
        let is_final = attempt >= policy.max_attempts;

        let (last_error, wait, server_directed) = match operation().await {
            FetchOutcome::Success { status_code, body } => {
                return Ok(FetchedPage {
                    status_code,
                    body,
                    attempts: attempt,
                });
            }
            FetchOutcome::ClientError { status_code } => {
                return Err(RetryError::ClientError { status_code });
            }
            FetchOutcome::RateLimited { retry_after } => {
                let last_error = "HTTP 429 Too Many Requests".to_string();
                match retry_after {
                    Some(retry_after) => (
                        last_error,
                        RetryPolicy::rate_limit_delay(retry_after, attempt),
                        true,
                    ),
                    None => (
                        last_error,
                        policy.jittered(policy.backoff_delay(attempt - 1)),
                        false,
                    ),
                }
            }
            FetchOutcome::TransientError { reason } => (
                reason,
                policy.jittered(policy.backoff_delay(attempt - 1)),
                false,
            ),
        };

        if is_final {
            return Err(RetryError::Exhausted {
                attempts: attempt,
                last_error,
            });
        }

        let remaining = state.remaining_window(policy);
        let wait = if wait <= remaining {
            wait
        } else if server_directed || remaining.is_zero() {
            tracing::debug!(
                "Retry window spent after {} attempt(s) ({:?} waited)",
                attempt,
                state.total_wait
            );
            return Err(RetryError::Exhausted {
                attempts: attempt,
                last_error,
            });
        } else {
            remaining
        };

        tracing::warn!(
            "Attempt {}/{} failed ({}), retrying in {:?}",
            attempt,
            policy.max_attempts,
            last_error,
            wait
        );

        tokio::time::sleep(wait).await;
        state.total_wait += wait;
    }
}
