// Constants for the retry executor

/// Attempt ordinal of the first attempt in a session
pub const FIRST_ATTEMPT: u32 = 1;

/// Default backoff seed in milliseconds
pub const DEFAULT_BACKOFF_BASE_MS: f64 = 100.0;

/// Default growth exponent applied to the backoff seed before each retry
pub const DEFAULT_BACKOFF_EXPONENT: f64 = 1.1;

/// Smallest accepted backoff exponent
pub const MIN_BACKOFF_EXPONENT: f64 = 1.0;

/// Milliseconds per second, used when converting backoff values to `Duration`
pub const MILLIS_PER_SECOND: f64 = 1_000.0;
