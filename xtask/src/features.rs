use anyhow::Result;

use crate::cargo;

const FEATURE_COMBINATIONS: &[&[&str]] = &[
    &[], // default
    &["config"],
    &["test-utils"],
    &["config", "test-utils"],
];

/// Run the `pulsearc-retry` test suite under every supported feature set.
///
/// Integration tests declare `required-features`, so each combination only
/// builds the suites it can support.
pub fn test_feature_matrix() -> Result<()> {
    println!("Testing {} pulsearc-retry feature combinations...", FEATURE_COMBINATIONS.len());

    for (index, features) in FEATURE_COMBINATIONS.iter().enumerate() {
        let joined = features.join(",");
        let is_default = features.is_empty();
        let display_label = if is_default { "default".to_string() } else { joined.clone() };

        let mut args = vec!["test", "-p", "pulsearc-retry", "--no-default-features"];
        if !is_default {
            args.push("--features");
            args.push(joined.as_str());
        }

        println!("\n[{}/{}] cargo {}", index + 1, FEATURE_COMBINATIONS.len(), args.join(" "));

        cargo(&args, &format!("Feature combination '{display_label}' failed"))?;

        println!("✅ Features '{display_label}' passed");
    }

    println!("\n✅ All {} feature combinations pass!", FEATURE_COMBINATIONS.len());

    Ok(())
}
