//! Testing utilities
//!
//! Helpers for exercising retry sessions in tests:
//! - [`AttemptRecorder`]: counts attempts and records when each one started,
//!   using the tokio clock so paused-time tests see exact backoff gaps
//! - [`init_test_tracing`]: installs a test-friendly `tracing` subscriber
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pulsearc_retry::testing::AttemptRecorder;
//! use pulsearc_retry::{retry, RetryOptions};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let recorder = AttemptRecorder::new();
//! let probe = recorder.clone();
//!
//! let result = retry(
//!     move || {
//!         let attempt = probe.record();
//!         async move { if attempt < 2 { Err("busy") } else { Ok(attempt) } }
//!     },
//!     RetryOptions::new().max(3).no_backoff(),
//! )
//! .await;
//!
//! assert_eq!(result.ok(), Some(2));
//! assert_eq!(recorder.count(), 2);
//! # }
//! ```

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

/// Records the start time of every attempt made through it
#[derive(Debug, Clone, Default)]
pub struct AttemptRecorder {
    starts: Arc<Mutex<Vec<Instant>>>,
}

impl AttemptRecorder {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an attempt starting now and return its 1-based ordinal
    pub fn record(&self) -> u32 {
        let mut starts = self.starts.lock().unwrap_or_else(PoisonError::into_inner);
        starts.push(Instant::now());
        u32::try_from(starts.len()).unwrap_or(u32::MAX)
    }

    /// Number of attempts recorded so far
    pub fn count(&self) -> u32 {
        let starts = self.starts.lock().unwrap_or_else(PoisonError::into_inner);
        u32::try_from(starts.len()).unwrap_or(u32::MAX)
    }

    /// Time between consecutive attempt starts
    pub fn gaps(&self) -> Vec<Duration> {
        let starts = self.starts.lock().unwrap_or_else(PoisonError::into_inner);
        starts.windows(2).map(|pair| pair[1].duration_since(pair[0])).collect()
    }
}

/// Install a `tracing` subscriber that writes through the test harness
///
/// Honors `RUST_LOG`, defaulting to `trace` for this crate. Safe to call from
/// every test; only the first call installs the subscriber.
pub fn init_test_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("pulsearc_retry=trace"));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_test_writer().try_init();
}
