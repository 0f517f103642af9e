//! Integration tests for file-based retry settings
//!
//! Loads settings from TOML and JSON, converts them into options, and runs
//! sessions under the resulting configuration.

#![cfg(feature = "config")]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use pulsearc_retry::{retry, ConfigError, RetryError, RetryExecutor, RetrySettings};

fn counting_failure(
    calls: &Arc<AtomicU32>,
    failure: &'static str,
) -> impl FnMut() -> std::future::Ready<Result<(), &'static str>> {
    let calls = Arc::clone(calls);
    move || {
        calls.fetch_add(1, Ordering::SeqCst);
        std::future::ready(Err(failure))
    }
}

/// Validates a TOML settings file driving match rules.
///
/// # Test Steps
/// 1. Load settings with `max = 4`, no backoff, and a single match string
/// 2. Run a session failing with the matching string
/// 3. Run a session failing with a different string
/// 4. Verify 4 attempts for the first and 1 for the second
#[tokio::test]
async fn test_toml_settings_drive_match_rules() -> anyhow::Result<()> {
    let settings = RetrySettings::from_toml_str(
        r#"
        max = 4
        backoff_base = 0
        match = "Foo"
        "#,
    )?;
    let executor = RetryExecutor::from_options(settings)?;

    let calls = Arc::new(AtomicU32::new(0));
    let result = executor.execute(counting_failure(&calls, "Foo")).await;
    assert_eq!(result.unwrap_err().into_operation_error(), Some("Foo"));
    assert_eq!(calls.load(Ordering::SeqCst), 4);

    let calls = Arc::new(AtomicU32::new(0));
    let result = executor.execute(counting_failure(&calls, "Bar")).await;
    assert_eq!(result.unwrap_err().into_operation_error(), Some("Bar"));
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    Ok(())
}

/// Validates JSON settings with the camelCase backoff keys.
#[tokio::test(start_paused = true)]
async fn test_json_settings_backoff() -> anyhow::Result<()> {
    let settings = RetrySettings::from_json_str(
        r#"{ "max": 3, "backoffBase": 100, "backoffExponent": 2, "match": ["Foo"] }"#,
    )?;
    let config = settings.into_options().build()?;

    let delays: Vec<Duration> = config.delays().take(2).collect();
    assert_eq!(delays, vec![Duration::from_millis(10_000), Duration::from_millis(100_000_000)]);

    let calls = Arc::new(AtomicU32::new(0));
    let started = tokio::time::Instant::now();
    let result = RetryExecutor::new(config).execute(counting_failure(&calls, "Foo")).await;

    assert!(result.is_err());
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert!(started.elapsed() >= Duration::from_millis(100_010_000));
    Ok(())
}

#[tokio::test]
async fn test_bare_integer_json_settings() -> anyhow::Result<()> {
    let settings = RetrySettings::from_json_str("2")?;
    let calls = Arc::new(AtomicU32::new(0));

    let options = settings.into_options().no_backoff();

    let result = retry(counting_failure(&calls, "down"), options).await;

    assert!(result.is_err());
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    Ok(())
}

/// Validates that invalid settings never reach the operation.
///
/// # Test Steps
/// 1. Parse settings whose exponent is below 1
/// 2. Run a session with them
/// 3. Verify `InvalidArgument` and zero invocations
#[tokio::test]
async fn test_invalid_settings_rejected_before_any_attempt() -> anyhow::Result<()> {
    let settings = RetrySettings::from_toml_str("backoff_exponent = 0.5")?;
    let calls = Arc::new(AtomicU32::new(0));

    let result = retry(counting_failure(&calls, "down"), settings).await;

    assert!(matches!(
        result,
        Err(RetryError::InvalidArgument(ConfigError::Invalid { field: "backoff_exponent", .. }))
    ));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    Ok(())
}

#[test]
fn test_malformed_documents_report_format() {
    let err = RetrySettings::from_toml_str("max = [").unwrap_err();
    assert!(matches!(err, ConfigError::Parse { format: "TOML", .. }));

    let err = RetrySettings::from_json_str("{ \"max\": \"three\" }").unwrap_err();
    assert!(matches!(err, ConfigError::Parse { format: "JSON", .. }));
}
