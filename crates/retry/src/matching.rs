//! Failure matching rules
//!
//! Match rules decide whether a failed attempt is eligible for another try.
//! A session with no rules retries every failure; otherwise the failure must
//! satisfy at least one rule. Rules are evaluated in order and evaluation
//! stops at the first match.
//!
//! Failures expose two textual views through the [`Failure`] trait:
//! - the **full representation** ([`Failure::describe`]): the error's display
//!   text followed by its `source()` chain, or the plain string itself
//! - the **message** ([`Failure::message`]): the top-level display text of an
//!   error-like failure; plain string failures have no message
//!
//! ```rust
//! use pulsearc_retry::{impl_failure, ErrorCategory, MatchRule};
//!
//! #[derive(Debug)]
//! struct Throttled;
//!
//! impl std::fmt::Display for Throttled {
//!     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
//!         write!(f, "throttled")
//!     }
//! }
//!
//! impl std::error::Error for Throttled {}
//!
//! impl_failure!(Throttled);
//!
//! let rule = MatchRule::category::<Throttled>();
//! assert!(rule.matches(&Throttled));
//! assert!(MatchRule::message("throttled").matches(&Throttled));
//! ```

use std::any::{type_name, Any, TypeId};
use std::error::Error as StdError;
use std::fmt;

/// A failure value that match rules can inspect
pub trait Failure {
    /// Full textual representation, compared against [`MatchRule::Text`]
    fn describe(&self) -> String;

    /// Message of an error-like failure, compared against
    /// [`MatchRule::Message`]. Plain values return `None`.
    fn message(&self) -> Option<String> {
        None
    }

    /// Whether this failure is an instance of `category`
    fn is_category(&self, category: &ErrorCategory) -> bool;
}

/// Render an error followed by its `source()` chain, joined with `": "`
pub fn error_chain(error: &(dyn StdError + 'static)) -> String {
    let mut text = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}

/// Implements [`Failure`] for concrete error types
///
/// The generated implementation describes the failure with its full source
/// chain, uses its display text as the message, and matches categories by
/// concrete type.
///
/// # Example
///
/// ```rust
/// use pulsearc_retry::{impl_failure, Failure};
///
/// #[derive(Debug)]
/// struct Unavailable;
///
/// impl std::fmt::Display for Unavailable {
///     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
///         write!(f, "service unavailable")
///     }
/// }
///
/// impl std::error::Error for Unavailable {}
///
/// impl_failure!(Unavailable);
///
/// assert_eq!(Unavailable.describe(), "service unavailable");
/// ```
#[macro_export]
macro_rules! impl_failure {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::Failure for $ty {
                fn describe(&self) -> String {
                    $crate::matching::error_chain(self)
                }

                fn message(&self) -> Option<String> {
                    Some(self.to_string())
                }

                fn is_category(&self, category: &$crate::ErrorCategory) -> bool {
                    category.matches_error(self)
                }
            }
        )+
    };
}

impl_failure!(std::io::Error, std::fmt::Error);

impl Failure for String {
    fn describe(&self) -> String {
        self.clone()
    }

    fn is_category(&self, category: &ErrorCategory) -> bool {
        category.matches_value(self)
    }
}

impl Failure for &'static str {
    fn describe(&self) -> String {
        (*self).to_string()
    }

    fn is_category(&self, category: &ErrorCategory) -> bool {
        category.matches_value(self)
    }
}

impl Failure for Box<dyn StdError + Send + Sync> {
    fn describe(&self) -> String {
        error_chain(&**self)
    }

    fn message(&self) -> Option<String> {
        Some(self.to_string())
    }

    fn is_category(&self, category: &ErrorCategory) -> bool {
        category.matches_error(&**self)
    }
}

impl Failure for Box<dyn StdError> {
    fn describe(&self) -> String {
        error_chain(&**self)
    }

    fn message(&self) -> Option<String> {
        Some(self.to_string())
    }

    fn is_category(&self, category: &ErrorCategory) -> bool {
        category.matches_error(&**self)
    }
}

/// A type-based failure category
///
/// Matches failures whose concrete type is `T`, including boxed trait objects
/// wrapping a `T`.
#[derive(Clone, Copy)]
pub struct ErrorCategory {
    type_id: TypeId,
    name: &'static str,
    value_probe: fn(&dyn Any) -> bool,
    error_probe: fn(&(dyn StdError + 'static)) -> bool,
}

impl ErrorCategory {
    /// Category of every failure whose concrete type is `T`
    pub fn of<T: StdError + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            name: type_name::<T>(),
            value_probe: |value| value.is::<T>(),
            error_probe: |error| error.is::<T>(),
        }
    }

    /// Type name of the category, for diagnostics only
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Identity of the category's error type
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Whether a plain value belongs to this category
    pub fn matches_value(&self, value: &dyn Any) -> bool {
        (self.value_probe)(value)
    }

    /// Whether an error (or the error inside a trait object) belongs to this
    /// category
    pub fn matches_error(&self, error: &(dyn StdError + 'static)) -> bool {
        (self.error_probe)(error)
    }
}

impl fmt::Debug for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ErrorCategory").field(&self.name).finish()
    }
}

impl PartialEq for ErrorCategory {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for ErrorCategory {}

/// A predicate deciding whether a failure may be retried
#[derive(Debug, Clone, PartialEq)]
pub enum MatchRule {
    /// Equals the failure's full representation
    Text(String),
    /// Equals the message of an error-like failure
    Message(String),
    /// The failure is an instance of the category
    Category(ErrorCategory),
}

impl MatchRule {
    /// Rule comparing against the full representation
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Rule comparing against the message of error-like failures
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    /// Rule matching failures of type `T`
    pub fn category<T: StdError + 'static>() -> Self {
        Self::Category(ErrorCategory::of::<T>())
    }

    /// Rules matching `text` as either the full representation or the message
    pub fn text_or_message(text: impl Into<String>) -> [Self; 2] {
        let text = text.into();
        [Self::Text(text.clone()), Self::Message(text)]
    }

    /// Evaluate the rule against a failure
    pub fn matches<F: Failure + ?Sized>(&self, failure: &F) -> bool {
        match self {
            Self::Text(text) => failure.describe() == *text,
            Self::Message(message) => failure.message().is_some_and(|m| m == *message),
            Self::Category(category) => failure.is_category(category),
        }
    }
}

/// Whether `failure` may be retried under `rules`
///
/// An empty rule set allows every failure.
pub fn allows_retry<F: Failure + ?Sized>(rules: &[MatchRule], failure: &F) -> bool {
    rules.is_empty() || rules.iter().any(|rule| rule.matches(failure))
}
