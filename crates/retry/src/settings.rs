//! File-based retry settings
//!
//! Retry options can be stated in TOML or JSON and converted into
//! [`RetryOptions`]:
//!
//! ```toml
//! max = 5
//! timeout = 2000          # milliseconds per attempt
//! backoff_base = 50
//! backoff_exponent = 1.5
//! match = ["connection reset", { message = "service unavailable" }]
//! ```
//!
//! A `match` entry is a plain string (compared against both the full
//! representation and the message of a failure), `{ text = ".." }`, or
//! `{ message = ".." }`. Category rules are type-based and can only be added
//! in code. JSON input may also be a bare integer, read as `max`.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::RetryOptions;
use crate::error::{ConfigError, ConfigResult};
use crate::matching::MatchRule;
use crate::utils::serde::option_duration_millis;

/// A single value or a list of values
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> Default for OneOrMany<T> {
    fn default() -> Self {
        Self::Many(Vec::new())
    }
}

impl<T> OneOrMany<T> {
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Many(items) if items.is_empty())
    }

    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::One(item) => vec![item],
            Self::Many(items) => items,
        }
    }
}

/// A match rule as written in a settings file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MatchSpec {
    /// Compared against both the full representation and the message
    Plain(String),
    Text { text: String },
    Message { message: String },
}

impl MatchSpec {
    fn into_rules(self) -> Vec<MatchRule> {
        match self {
            Self::Plain(text) => MatchRule::text_or_message(text).into(),
            Self::Text { text } => vec![MatchRule::Text(text)],
            Self::Message { message } => vec![MatchRule::Message(message)],
        }
    }
}

/// Retry options as stated in a settings file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetrySettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<u32>,

    /// Per-attempt deadline in milliseconds; zero disables it
    #[serde(with = "option_duration_millis", skip_serializing_if = "Option::is_none")]
    pub timeout: Option<Duration>,

    #[serde(rename = "match", skip_serializing_if = "OneOrMany::is_empty")]
    pub matches: OneOrMany<MatchSpec>,

    #[serde(alias = "backoffBase", skip_serializing_if = "Option::is_none")]
    pub backoff_base: Option<f64>,

    #[serde(alias = "backoffExponent", skip_serializing_if = "Option::is_none")]
    pub backoff_exponent: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Settings input: a bare attempt count or a full settings object
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RetrySettingsInput {
    Max(u32),
    Settings(RetrySettings),
}

impl From<RetrySettingsInput> for RetrySettings {
    fn from(input: RetrySettingsInput) -> Self {
        match input {
            RetrySettingsInput::Max(max) => Self { max: Some(max), ..Self::default() },
            RetrySettingsInput::Settings(settings) => settings,
        }
    }
}

impl RetrySettings {
    /// Parse settings from a TOML document
    pub fn from_toml_str(input: &str) -> ConfigResult<Self> {
        toml::from_str(input).map_err(|err| ConfigError::parse("TOML", err))
    }

    /// Parse settings from JSON; a bare integer is read as `max`
    pub fn from_json_str(input: &str) -> ConfigResult<Self> {
        serde_json::from_str::<RetrySettingsInput>(input)
            .map(Self::from)
            .map_err(|err| ConfigError::parse("JSON", err))
    }

    /// Render the settings as a TOML document
    pub fn to_toml_string(&self) -> ConfigResult<String> {
        toml::to_string(self).map_err(|err| ConfigError::parse("TOML", err))
    }

    /// Convert into un-normalized options
    pub fn into_options(self) -> RetryOptions {
        self.into()
    }
}

impl From<RetrySettings> for RetryOptions {
    fn from(settings: RetrySettings) -> Self {
        Self {
            max: settings.max,
            timeout: settings.timeout,
            matches: settings
                .matches
                .into_vec()
                .into_iter()
                .flat_map(MatchSpec::into_rules)
                .collect(),
            backoff_base: settings.backoff_base,
            backoff_exponent: settings.backoff_exponent,
            current_attempt: None,
            name: settings.name,
        }
    }
}

impl From<RetrySettingsInput> for RetryOptions {
    fn from(input: RetrySettingsInput) -> Self {
        RetrySettings::from(input).into()
    }
}
