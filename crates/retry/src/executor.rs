//! Retry executor
//!
//! Runs a fallible async operation until it succeeds, the attempt ceiling is
//! reached, the match rules refuse a retry, or an attempt times out.
//!
//! Each session is a self-contained state machine: an immutable
//! [`RetryConfig`] plus a [`RetryState`] advanced by value between attempts.
//! Attempts are strictly sequential; attempt N+1 starts only after attempt N
//! settled and its backoff elapsed.
//!
//! # Timeouts
//!
//! When a per-attempt timeout is configured the attempt future is raced
//! against it. If the deadline wins, the attempt future is dropped and the
//! session settles with [`RetryError::Timeout`]. The operation receives no
//! signal: work it already handed to spawned tasks or threads keeps running
//! and its eventual result is discarded. Timeouts are never retried.
//!
//! # Example
//!
//! ```rust
//! use std::sync::atomic::{AtomicU32, Ordering};
//! use std::sync::Arc;
//!
//! use pulsearc_retry::{retry, RetryOptions};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let calls = Arc::new(AtomicU32::new(0));
//! let counter = calls.clone();
//!
//! let value = retry(
//!     move || {
//!         let attempt = counter.fetch_add(1, Ordering::SeqCst) + 1;
//!         async move { if attempt < 3 { Err("not yet") } else { Ok(attempt) } }
//!     },
//!     RetryOptions::new().max(5).no_backoff(),
//! )
//! .await;
//!
//! assert_eq!(value.ok(), Some(3));
//! assert_eq!(calls.load(Ordering::SeqCst), 3);
//! # }
//! ```

use std::any::type_name;
use std::future::Future;
use std::time::Duration;

use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, instrument, trace, warn};

use crate::backoff::RetryState;
use crate::config::{RetryConfig, RetryOptions};
use crate::error::{ConfigError, ConfigResult, RetryError, RetryResult};
use crate::matching::{allows_retry, Failure};

/// Result of a retry session together with its statistics
#[derive(Debug)]
pub struct RetryOutcome<T, E> {
    pub result: RetryResult<T, E>,
    /// Attempts actually made by this session
    pub attempts: u32,
    /// Total backoff slept between attempts
    pub total_delay: Duration,
    pub timed_out: bool,
    pub started_at: Instant,
    /// Full representation of the last failed attempt
    pub last_error: Option<String>,
}

impl<T, E> RetryOutcome<T, E> {
    /// Consume the outcome and return only the result.
    pub fn into_result(self) -> RetryResult<T, E> {
        self.result
    }

    pub fn succeeded(&self) -> bool {
        self.result.is_ok()
    }

    /// Time from the start of the session until now.
    pub fn total_elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Average backoff between attempts (excludes operation execution time).
    pub fn average_delay(&self) -> Duration {
        if self.attempts <= 1 {
            return Duration::ZERO;
        }
        self.total_delay / (self.attempts - 1)
    }
}

/// Bookkeeping for one session
struct SessionStats {
    attempts: u32,
    total_delay: Duration,
    started_at: Instant,
    last_error: Option<String>,
}

impl SessionStats {
    fn new() -> Self {
        Self {
            attempts: 0,
            total_delay: Duration::ZERO,
            started_at: Instant::now(),
            last_error: None,
        }
    }

    fn finish<T, E>(self, result: RetryResult<T, E>, timed_out: bool) -> RetryOutcome<T, E> {
        RetryOutcome {
            result,
            attempts: self.attempts,
            total_delay: self.total_delay,
            timed_out,
            started_at: self.started_at,
            last_error: self.last_error,
        }
    }
}

/// Runs operations under a fixed retry configuration
///
/// An executor holds no per-session state, so one instance can drive any
/// number of sessions, concurrently or not.
#[derive(Debug, Clone, Default)]
pub struct RetryExecutor {
    config: RetryConfig,
}

impl RetryExecutor {
    /// Create an executor for an already normalized configuration
    ///
    /// The configuration is validated again at the start of every session, so
    /// a hand-built invalid configuration fails with
    /// [`RetryError::InvalidArgument`] instead of running.
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Normalize and validate caller options into an executor
    pub fn from_options(options: impl Into<RetryOptions>) -> ConfigResult<Self> {
        options.into().build().map(Self::new)
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Execute an operation with retry logic
    #[instrument(
        skip(self, operation),
        fields(max_attempts = ?self.config.max_attempts, operation = self.config.name.as_deref())
    )]
    pub async fn execute<F, Fut, T, E>(&self, operation: F) -> RetryResult<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Failure,
    {
        self.execute_with_outcome(operation).await.into_result()
    }

    /// Execute an operation with retry logic and return outcome statistics.
    pub async fn execute_with_outcome<F, Fut, T, E>(&self, mut operation: F) -> RetryOutcome<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Failure,
    {
        let label = self.operation_label::<F>();
        let mut stats = SessionStats::new();

        if let Err(err) = self.config.validate() {
            warn!(operation = %label, error = %err, "Rejected retry configuration");
            return stats.finish(Err(err.into()), false);
        }

        let mut state = RetryState::new(&self.config);

        loop {
            stats.attempts = stats.attempts.saturating_add(1);
            trace!(operation = %label, attempt = state.attempt, "Trying operation");

            let settled = match self.config.timeout {
                Some(limit) => {
                    if let Ok(settled) = timeout(limit, operation()).await {
                        settled
                    } else {
                        warn!(
                            operation = %label,
                            attempt = state.attempt,
                            timeout_ms = duration_millis(limit),
                            "Attempt timed out"
                        );
                        stats.last_error = Some(format!("{label} timed out after {limit:?}"));
                        let err = RetryError::Timeout {
                            operation: label,
                            timeout: limit,
                            attempt: state.attempt,
                        };
                        return stats.finish(Err(err), true);
                    }
                }
                None => operation().await,
            };

            let failure = match settled {
                Ok(value) => {
                    if stats.attempts > 1 {
                        debug!(
                            operation = %label,
                            attempts = stats.attempts,
                            "Operation succeeded after retries"
                        );
                    }
                    return stats.finish(Ok(value), false);
                }
                Err(failure) => failure,
            };

            let description = failure.describe();
            debug!(
                operation = %label,
                attempt = state.attempt,
                error = %description,
                "Attempt failed"
            );
            stats.last_error = Some(description);

            if state.is_final(self.config.max_attempts) {
                warn!(operation = %label, attempts = state.attempt, "All retry attempts exhausted");
                return stats.finish(Err(RetryError::Operation(failure)), false);
            }

            if !allows_retry(&self.config.matches, &failure) {
                debug!(
                    operation = %label,
                    attempt = state.attempt,
                    "Failure does not match retry rules"
                );
                return stats.finish(Err(RetryError::Operation(failure)), false);
            }

            match state.advance(self.config.backoff_exponent) {
                Some(delay) => {
                    trace!(
                        operation = %label,
                        attempt = state.attempt,
                        delay_ms = duration_millis(delay),
                        "Delaying next attempt"
                    );
                    sleep(delay).await;
                    stats.total_delay = stats.total_delay.saturating_add(delay);
                }
                None => {
                    trace!(operation = %label, attempt = state.attempt, "Backoff disabled");
                    tokio::task::yield_now().await;
                }
            }
        }
    }

    fn operation_label<F>(&self) -> String {
        self.config.name.clone().unwrap_or_else(|| type_name::<F>().to_string())
    }
}

fn duration_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Retry `operation` under `options`
///
/// `options` is a [`RetryOptions`] value or a bare attempt count, so
/// `retry(op, 3)` is shorthand for `retry(op, RetryOptions::new().max(3))`.
/// Invalid options fail with [`RetryError::InvalidArgument`] before the
/// operation is invoked.
pub async fn retry<F, Fut, T, E>(
    operation: F,
    options: impl Into<RetryOptions>,
) -> RetryResult<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Failure,
{
    let config = options.into().build()?;
    RetryExecutor::new(config).execute(operation).await
}

/// Retry with inputs that may be absent
///
/// A missing operation or missing options fails with
/// [`RetryError::InvalidArgument`] before any attempt is made or timer armed.
pub async fn retry_optional<F, Fut, T, E>(
    operation: Option<F>,
    options: Option<RetryOptions>,
) -> RetryResult<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Failure,
{
    let operation = operation.ok_or(ConfigError::MissingOperation)?;
    let options = options.ok_or(ConfigError::MissingOptions)?;
    retry(operation, options).await
}
