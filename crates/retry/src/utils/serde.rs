//! Serde helpers for durations expressed in milliseconds
//!
//! Retry settings files state timeouts as integer milliseconds, matching the
//! unit of the backoff fields.

use std::time::Duration;

use serde::{Deserialize, Deserializer, Serializer};

/// Serde serialization result type
type SerializeResult<S> = Result<<S as Serializer>::Ok, <S as Serializer>::Error>;

/// `Option<Duration>` as optional milliseconds (u64)
///
/// Pair with `#[serde(default)]` so an absent field reads as `None`.
///
/// # Usage
/// ```rust
/// use std::time::Duration;
///
/// use pulsearc_retry::utils::serde::option_duration_millis;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct Example {
///     #[serde(default, with = "option_duration_millis")]
///     timeout: Option<Duration>,
/// }
/// ```
pub mod option_duration_millis {
    use super::{Deserialize, Deserializer, Duration, SerializeResult, Serializer};

    /// Serialize as milliseconds, saturating at `u64::MAX`
    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> SerializeResult<S>
    where
        S: Serializer,
    {
        match duration {
            Some(duration) => {
                let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
                serializer.serialize_some(&millis)
            }
            None => serializer.serialize_none(),
        }
    }

    /// Deserialize optional milliseconds into a Duration
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = Option::<u64>::deserialize(deserializer)?;
        Ok(millis.map(Duration::from_millis))
    }
}
