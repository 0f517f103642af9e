//! Attempt accounting and backoff growth
//!
//! The delay before each retry is derived by exponentiating the previous seed:
//! `base = base ^ exponent`. With the defaults (100ms, 1.1) the delays run
//! roughly 158ms, 263ms, 459ms, ... and growth accelerates quickly once the
//! seed exceeds one millisecond. A seed of zero disables the delay entirely.

use std::time::Duration;

use crate::config::RetryConfig;
use crate::constants::MILLIS_PER_SECOND;

/// Mutable state carried from one attempt to the next
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryState {
    /// 1-based ordinal of the attempt about to run or just completed
    pub attempt: u32,
    /// Current backoff seed in milliseconds
    pub backoff_base: f64,
}

impl RetryState {
    /// Initial state for a session
    pub fn new(config: &RetryConfig) -> Self {
        Self { attempt: config.start_attempt, backoff_base: config.backoff_base }
    }

    /// Whether the current attempt is the last one allowed
    pub fn is_final(&self, max_attempts: Option<u32>) -> bool {
        max_attempts == Some(self.attempt)
    }

    /// Move to the next attempt
    ///
    /// Returns the delay to wait before it, or `None` when backoff is disabled
    /// and the next attempt should run immediately.
    pub fn advance(&mut self, exponent: f64) -> Option<Duration> {
        self.attempt = self.attempt.saturating_add(1);

        if self.backoff_base <= 0.0 {
            return None;
        }

        self.backoff_base = self.backoff_base.powf(exponent);
        Some(millis_to_duration(self.backoff_base))
    }
}

/// Convert fractional milliseconds into a `Duration`
///
/// Values too large to represent saturate to `Duration::MAX`.
pub fn millis_to_duration(millis: f64) -> Duration {
    if millis <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(millis / MILLIS_PER_SECOND).unwrap_or(Duration::MAX)
}

/// Iterator over the delays a configuration inserts between attempts
///
/// Yields the delay before attempt 2, then attempt 3, and so on. Empty when
/// backoff is disabled; otherwise unbounded, so pair it with `take`.
#[derive(Debug, Clone)]
pub struct BackoffDelays {
    state: RetryState,
    exponent: f64,
}

impl BackoffDelays {
    pub(crate) fn new(config: &RetryConfig) -> Self {
        Self { state: RetryState::new(config), exponent: config.backoff_exponent }
    }
}

impl Iterator for BackoffDelays {
    type Item = Duration;

    fn next(&mut self) -> Option<Self::Item> {
        self.state.advance(self.exponent)
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for backoff growth.
    //!
    //! Tests cover exponentiation growth, disabled backoff, saturation of
    //! oversized delays, and attempt accounting.

    use super::*;
    use crate::config::RetryOptions;

    /// Validates exponentiation growth of the backoff seed.
    ///
    /// Assertions:
    /// - With base 100 and exponent 2 the first delay is 10 000ms.
    /// - The second delay is 1e8ms, confirming exponentiation rather than
    ///   multiplication.
    #[test]
    fn test_backoff_grows_by_exponentiation() {
        let config = RetryOptions::new().backoff_base(100.0).backoff_exponent(2.0).build().unwrap();

        let delays: Vec<Duration> = config.delays().take(2).collect();
        assert_eq!(delays, vec![Duration::from_millis(10_000), Duration::from_millis(100_000_000)]);
    }

    #[test]
    fn test_default_backoff_sequence() {
        let config = RetryConfig::default();
        let delays: Vec<u128> = config.delays().take(3).map(|d| d.as_millis()).collect();

        // 100^1.1 = 158.49, 158.49^1.1 = 263.03, 263.03^1.1 = 459.20
        assert_eq!(delays, vec![158, 263, 459]);
    }

    #[test]
    fn test_zero_base_disables_backoff() {
        let mut state = RetryState { attempt: 1, backoff_base: 0.0 };
        assert_eq!(state.advance(2.0), None);
        assert_eq!(state.attempt, 2);
        assert_eq!(state.advance(2.0), None);
        assert_eq!(state.attempt, 3);
    }

    /// Validates `RetryState::advance` behavior for the unit exponent scenario.
    ///
    /// Assertions:
    /// - An exponent of 1 keeps the delay constant.
    #[test]
    fn test_unit_exponent_keeps_delay_constant() {
        let mut state = RetryState { attempt: 1, backoff_base: 250.0 };
        for _ in 0..3 {
            assert_eq!(state.advance(1.0), Some(Duration::from_millis(250)));
        }
        assert_eq!(state.attempt, 4);
    }

    #[test]
    fn test_oversized_delay_saturates() {
        let mut state = RetryState { attempt: 1, backoff_base: 1e200 };
        assert_eq!(state.advance(2.0), Some(Duration::MAX));
        assert_eq!(millis_to_duration(f64::INFINITY), Duration::MAX);
        assert_eq!(millis_to_duration(0.0), Duration::ZERO);
        assert_eq!(millis_to_duration(250.0), Duration::from_millis(250));
    }

    #[test]
    fn test_final_attempt_detection() {
        let state = RetryState { attempt: 3, backoff_base: 0.0 };
        assert!(state.is_final(Some(3)));
        assert!(!state.is_final(Some(4)));
        assert!(!state.is_final(None));
    }

    #[test]
    fn test_state_starts_from_config() {
        let config = RetryOptions::new().current_attempt(2).backoff_base(5.0).build().unwrap();
        let state = RetryState::new(&config);
        assert_eq!(state, RetryState { attempt: 2, backoff_base: 5.0 });
    }
}
