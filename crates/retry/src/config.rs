//! Retry configuration
//!
//! [`RetryOptions`] is what callers hand in: every field optional, nothing
//! normalized. [`RetryOptions::build`] applies defaults, validates, and produces
//! the immutable [`RetryConfig`] an executor runs with.
//!
//! A bare attempt count converts into options, so `retry(op, 3)` behaves the
//! same as `retry(op, RetryOptions::new().max(3))`.

use std::time::Duration;

use crate::backoff::BackoffDelays;
use crate::constants::{
    DEFAULT_BACKOFF_BASE_MS, DEFAULT_BACKOFF_EXPONENT, FIRST_ATTEMPT, MIN_BACKOFF_EXPONENT,
};
use crate::error::{ConfigError, ConfigResult};
use crate::matching::MatchRule;

/// Caller-supplied retry options
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RetryOptions {
    /// Total attempts including the first; `None` retries without bound
    pub max: Option<u32>,
    /// Per-attempt deadline; zero disables it
    pub timeout: Option<Duration>,
    /// Rules a failure must satisfy to be retried; empty retries everything
    pub matches: Vec<MatchRule>,
    /// Backoff seed in milliseconds; zero disables backoff
    pub backoff_base: Option<f64>,
    /// Growth exponent applied to the seed before each retry
    pub backoff_exponent: Option<f64>,
    /// Ordinal of the first attempt this session runs
    pub current_attempt: Option<u32>,
    /// Label used in logs and timeout errors
    pub name: Option<String>,
}

impl From<u32> for RetryOptions {
    fn from(max: u32) -> Self {
        Self { max: Some(max), ..Self::default() }
    }
}

impl RetryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max(mut self, attempts: u32) -> Self {
        self.max = Some(attempts);
        self
    }

    pub fn unbounded(mut self) -> Self {
        self.max = None;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Add a single match rule
    pub fn match_rule(mut self, rule: MatchRule) -> Self {
        self.matches.push(rule);
        self
    }

    /// Add several match rules, keeping their order
    pub fn match_rules(mut self, rules: impl IntoIterator<Item = MatchRule>) -> Self {
        self.matches.extend(rules);
        self
    }

    /// Retry failures whose full representation or message equals `text`
    pub fn match_str(self, text: impl Into<String>) -> Self {
        self.match_rules(MatchRule::text_or_message(text))
    }

    pub fn backoff_base(mut self, millis: f64) -> Self {
        self.backoff_base = Some(millis);
        self
    }

    pub fn backoff_exponent(mut self, exponent: f64) -> Self {
        self.backoff_exponent = Some(exponent);
        self
    }

    /// Disable the delay between attempts
    pub fn no_backoff(self) -> Self {
        self.backoff_base(0.0)
    }

    pub fn current_attempt(mut self, attempt: u32) -> Self {
        self.current_attempt = Some(attempt);
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Apply defaults and validate
    pub fn build(self) -> ConfigResult<RetryConfig> {
        let config = RetryConfig {
            max_attempts: self.max,
            timeout: self.timeout.filter(|timeout| !timeout.is_zero()),
            matches: self.matches,
            backoff_base: self.backoff_base.unwrap_or(DEFAULT_BACKOFF_BASE_MS),
            backoff_exponent: self
                .backoff_exponent
                .filter(|exponent| *exponent != 0.0)
                .unwrap_or(DEFAULT_BACKOFF_EXPONENT),
            start_attempt: self
                .current_attempt
                .filter(|attempt| *attempt != 0)
                .unwrap_or(FIRST_ATTEMPT),
            name: self.name,
        };
        config.validate()?;
        Ok(config)
    }
}

/// Normalized retry configuration
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Total attempts including the first; `None` retries without bound
    pub max_attempts: Option<u32>,
    /// Per-attempt deadline
    pub timeout: Option<Duration>,
    /// Rules a failure must satisfy to be retried; empty retries everything
    pub matches: Vec<MatchRule>,
    /// Backoff seed in milliseconds; zero disables backoff
    pub backoff_base: f64,
    /// Growth exponent applied to the seed before each retry
    pub backoff_exponent: f64,
    /// Ordinal of the first attempt this session runs
    pub start_attempt: u32,
    /// Label used in logs and timeout errors
    pub name: Option<String>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: None,
            timeout: None,
            matches: Vec::new(),
            backoff_base: DEFAULT_BACKOFF_BASE_MS,
            backoff_exponent: DEFAULT_BACKOFF_EXPONENT,
            start_attempt: FIRST_ATTEMPT,
            name: None,
        }
    }
}

impl RetryConfig {
    /// Start building a configuration from empty options
    pub fn builder() -> RetryOptions {
        RetryOptions::new()
    }

    /// Validate the configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(max) = self.max_attempts {
            if max == 0 {
                return Err(ConfigError::invalid("max", "must be at least 1"));
            }
            if self.start_attempt > max {
                return Err(ConfigError::invalid(
                    "current_attempt",
                    format!("attempt {} is beyond max attempts {max}", self.start_attempt),
                ));
            }
        }

        if self.start_attempt == 0 {
            return Err(ConfigError::invalid("current_attempt", "must be at least 1"));
        }

        if !self.backoff_base.is_finite() || self.backoff_base < 0.0 {
            return Err(ConfigError::invalid(
                "backoff_base",
                format!(
                    "must be a finite, non-negative number of milliseconds, got {}",
                    self.backoff_base
                ),
            ));
        }

        if !self.backoff_exponent.is_finite() || self.backoff_exponent < MIN_BACKOFF_EXPONENT {
            return Err(ConfigError::invalid(
                "backoff_exponent",
                format!(
                    "must be a finite number >= {MIN_BACKOFF_EXPONENT}, got {}",
                    self.backoff_exponent
                ),
            ));
        }

        Ok(())
    }

    /// Whether a delay is inserted between attempts
    pub fn has_backoff(&self) -> bool {
        self.backoff_base > 0.0
    }

    /// Preview the delays inserted before the second, third, ... attempts
    pub fn delays(&self) -> BackoffDelays {
        BackoffDelays::new(self)
    }
}
