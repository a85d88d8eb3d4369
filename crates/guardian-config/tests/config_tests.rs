// SPDX-FileCopyrightText: 2026 Guardian Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Guardian configuration system.

use guardian_config::diagnostic::{ConfigError, suggest_key};
use guardian_config::model::GuardianConfig;
use guardian_config::{load_and_validate_str, load_config_from_str};

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_guardian_config() {
    let toml = r#"
[agent]
name = "test-guardian"
log_level = "debug"

[monitor]
channel_id = "C0123456789"
parent_email = "parent@example.com"
poll_interval_secs = 30
alert_threshold = "predatory"
fetch_limit = 100

[slack]
bot_token = "xoxb-123"

[anthropic]
api_key = "sk-ant-123"
model = "claude-haiku-4-5-20250901"

[email]
smtp_host = "smtp.example.com"
smtp_port = 465
smtp_username = "alerts"
smtp_password = "hunter2"
from_address = "guardian@example.com"

[storage]
database_path = "/tmp/test.db"
wal_mode = false
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.agent.name, "test-guardian");
    assert_eq!(config.agent.log_level, "debug");
    assert_eq!(config.monitor.channel_id.as_deref(), Some("C0123456789"));
    assert_eq!(
        config.monitor.parent_email.as_deref(),
        Some("parent@example.com")
    );
    assert_eq!(config.monitor.poll_interval_secs, 30);
    assert_eq!(config.monitor.alert_threshold, "predatory");
    assert_eq!(config.monitor.fetch_limit, 100);
    assert_eq!(config.slack.bot_token.as_deref(), Some("xoxb-123"));
    assert_eq!(config.anthropic.api_key.as_deref(), Some("sk-ant-123"));
    assert_eq!(config.email.smtp_host, "smtp.example.com");
    assert_eq!(config.email.smtp_port, 465);
    assert_eq!(config.email.from_address, "guardian@example.com");
    assert_eq!(config.storage.database_path, "/tmp/test.db");
    assert!(!config.storage.wal_mode);
}

/// Unknown field in [monitor] section produces an UnknownField error.
#[test]
fn unknown_field_in_monitor_produces_error() {
    let toml = r#"
[monitor]
chanel_id = "C123"
"#;

    let err = load_config_from_str(toml).expect_err("should reject unknown field");
    let err_str = format!("{err}");
    // Figment wraps serde's deny_unknown_fields error
    assert!(
        err_str.contains("unknown field") || err_str.contains("chanel_id"),
        "error should mention unknown field or the bad key, got: {err_str}"
    );
}

/// Missing optional sections use defaults without error.
#[test]
fn missing_optional_sections_use_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");

    assert_eq!(config.agent.name, "guardian");
    assert_eq!(config.agent.log_level, "info");
    assert!(config.monitor.channel_id.is_none());
    assert!(config.monitor.parent_email.is_none());
    assert_eq!(config.monitor.poll_interval_secs, 60);
    assert_eq!(config.monitor.alert_threshold, "suspicious");
    assert!(config.slack.bot_token.is_none());
    assert!(config.anthropic.api_key.is_none());
    assert_eq!(config.email.smtp_port, 587);
    assert!(config.storage.wal_mode);
}

/// Dot-notation override maps onto nested sections the way the
/// `GUARDIAN_SLACK_BOT_TOKEN` env mapping does.
#[test]
fn dotted_override_sets_slack_bot_token() {
    use figment::{Figment, providers::Serialized};

    let config: GuardianConfig = Figment::new()
        .merge(Serialized::defaults(GuardianConfig::default()))
        .merge(("slack.bot_token", "xoxb-from-env"))
        .extract()
        .expect("should set bot_token via dot notation");

    assert_eq!(config.slack.bot_token.as_deref(), Some("xoxb-from-env"));
}

/// TOML value overrides compiled default, later layers win.
#[test]
fn layered_merge_later_overrides_earlier() {
    use figment::{
        Figment,
        providers::{Format, Serialized, Toml},
    };

    let toml_content = r#"
[monitor]
poll_interval_secs = 30
"#;

    let config: GuardianConfig = Figment::new()
        .merge(Serialized::defaults(GuardianConfig::default()))
        .merge(Toml::string(toml_content))
        .merge(("monitor.poll_interval_secs", 10u64))
        .extract()
        .expect("should merge override");

    assert_eq!(config.monitor.poll_interval_secs, 10);
}

/// load_and_validate_str surfaces validation errors as ConfigError values.
#[test]
fn validation_errors_surface_through_entry_point() {
    let toml = r#"
[monitor]
poll_interval_secs = 0
alert_threshold = "severe"
"#;

    let errors = load_and_validate_str(toml).expect_err("should fail validation");
    assert!(errors.len() >= 2);
    assert!(errors.iter().all(|e| matches!(e, ConfigError::Validation { .. })));
}

/// Typo suggestions come from the monitor section's real key set.
#[test]
fn typo_suggestion_for_monitor_keys() {
    let valid = &[
        "channel_id",
        "parent_email",
        "poll_interval_secs",
        "alert_threshold",
        "fetch_limit",
        "backoff_base_secs",
        "backoff_max_secs",
    ];
    assert_eq!(
        suggest_key("alert_treshold", valid),
        Some("alert_threshold".to_string())
    );
    assert_eq!(
        suggest_key("pol_interval_secs", valid),
        Some("poll_interval_secs".to_string())
    );
}

/// A fully valid config passes the whole pipeline.
#[test]
fn complete_config_passes_load_and_validate() {
    let toml = r#"
[monitor]
channel_id = "C123"
parent_email = "parent@example.com"

[anthropic]
api_key = "sk-ant-test"
"#;

    let config = load_and_validate_str(toml).expect("should validate");
    let mc = config.monitor_config();
    assert!(mc.validate().is_ok());
}
