//! Error types surfaced by the retry executor
//!
//! A retry session settles with exactly one terminal failure:
//! - [`RetryError::Operation`]: the last failure produced by the operation,
//!   unchanged, once attempts are exhausted or the match rules refuse a retry
//! - [`RetryError::Timeout`]: an attempt did not settle within the per-attempt
//!   deadline; never retried
//! - [`RetryError::InvalidArgument`]: the inputs were rejected before any
//!   attempt was made

use std::time::Duration;

use thiserror::Error;

/// Errors produced while normalizing or validating retry inputs
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// No operation was supplied
    #[error("retry requires an operation to execute")]
    MissingOperation,

    /// No options were supplied
    #[error("retry requires options or a maximum attempt count")]
    MissingOptions,

    /// A value is outside its accepted range
    #[error("Invalid {field}: {message}")]
    Invalid {
        /// Option the value was supplied for
        field: &'static str,
        /// Why the value was rejected
        message: String,
    },

    /// Settings could not be parsed from their textual form
    #[error("Failed to parse {format} retry settings: {message}")]
    Parse {
        /// Document format, `TOML` or `JSON`
        format: &'static str,
        /// Parser error text
        message: String,
    },
}

impl ConfigError {
    /// Create an [`ConfigError::Invalid`] for the given field
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid { field, message: message.into() }
    }

    /// Create a [`ConfigError::Parse`] for the given format
    pub fn parse(format: &'static str, message: impl ToString) -> Self {
        Self::Parse { format, message: message.to_string() }
    }
}

/// Result type for configuration building
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Terminal failure of a retry session
#[derive(Debug, Error)]
pub enum RetryError<E> {
    /// The operation failed and retrying was exhausted or not allowed
    #[error("{0}")]
    Operation(E),

    /// An attempt did not settle before the per-attempt deadline
    ///
    /// The attempt future was dropped without notice to the operation.
    /// Never retried.
    #[error("{operation} timed out after {timeout:?} (attempt {attempt})")]
    Timeout {
        /// Configured operation name, or the operation's type name
        operation: String,
        /// The per-attempt deadline that elapsed
        timeout: Duration,
        /// Ordinal of the attempt that timed out
        attempt: u32,
    },

    /// The retry inputs were rejected before any attempt
    #[error("Invalid retry argument: {0}")]
    InvalidArgument(#[from] ConfigError),
}

impl<E> RetryError<E> {
    /// Whether the session ended because an attempt timed out
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Whether the inputs were rejected before any attempt
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }

    /// Borrow the operation's own failure, if that is what ended the session
    pub fn operation_error(&self) -> Option<&E> {
        match self {
            Self::Operation(err) => Some(err),
            _ => None,
        }
    }

    /// Take the operation's own failure, if that is what ended the session
    pub fn into_operation_error(self) -> Option<E> {
        match self {
            Self::Operation(err) => Some(err),
            _ => None,
        }
    }
}

/// Result type for retry operations
pub type RetryResult<T, E> = Result<T, RetryError<E>>;
