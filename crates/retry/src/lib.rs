//! Retry-with-backoff for fallible async operations.
//!
//! An operation factory is invoked until it succeeds, the attempt ceiling is
//! reached, a failure is refused by the match rules, or an attempt exceeds its
//! per-attempt timeout. Between attempts the backoff seed is exponentiated
//! (`base = base ^ exponent`) and slept for that many milliseconds.
//!
//! # Feature Flags
//!
//! - `config`: serde-backed [`RetrySettings`] loaded from TOML or JSON
//! - `test-utils`: [`testing`] helpers (attempt recorder, tracing init)
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//!
//! use pulsearc_retry::{retry, RetryOptions};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let options = RetryOptions::new()
//!     .max(3)
//!     .timeout(Duration::from_secs(1))
//!     .match_str("connection reset")
//!     .backoff_base(0.0);
//!
//! let result = retry(|| async { Ok::<_, String>(42) }, options).await;
//! assert_eq!(result.ok(), Some(42));
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod backoff;
pub mod config;
pub mod constants;
pub mod error;
pub mod executor;
pub mod matching;

#[cfg(feature = "config")]
pub mod settings;
#[cfg(feature = "config")]
pub mod utils;

// Testing utilities
// ---------------------------------------------------------------
#[cfg(any(feature = "test-utils", test))]
pub mod testing;

// Re-export commonly used types for convenience
// ------------------------
pub use backoff::{BackoffDelays, RetryState};
pub use config::{RetryConfig, RetryOptions};
pub use error::{ConfigError, ConfigResult, RetryError, RetryResult};
pub use executor::{retry, retry_optional, RetryExecutor, RetryOutcome};
pub use matching::{ErrorCategory, Failure, MatchRule};
#[cfg(feature = "config")]
pub use settings::{MatchSpec, OneOrMany, RetrySettings, RetrySettingsInput};
