// SPDX-FileCopyrightText: 2026 Guardian Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Guardian monitoring agent.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::str::FromStr;
use std::time::Duration;

use guardian_core::{MonitorConfig, Severity};
use serde::{Deserialize, Serialize};

/// Top-level Guardian configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values;
/// completeness of the monitoring fields is enforced when a session starts,
/// not at load time.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GuardianConfig {
    /// Agent identity and logging settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Monitoring session settings.
    #[serde(default)]
    pub monitor: MonitorSectionConfig,

    /// Slack Web API settings.
    #[serde(default)]
    pub slack: SlackConfig,

    /// Anthropic API settings.
    #[serde(default)]
    pub anthropic: AnthropicConfig,

    /// SMTP alert delivery settings.
    #[serde(default)]
    pub email: EmailConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,
}

impl GuardianConfig {
    /// Assembles the runtime [`MonitorConfig`] from the relevant sections.
    ///
    /// Missing optional fields become empty strings; completeness is
    /// checked by [`MonitorConfig::validate`] on the Starting transition.
    pub fn monitor_config(&self) -> MonitorConfig {
        MonitorConfig {
            channel_id: self.monitor.channel_id.clone().unwrap_or_default(),
            parent_email: self.monitor.parent_email.clone().unwrap_or_default(),
            api_key: self.anthropic.api_key.clone().unwrap_or_default(),
            poll_interval: Duration::from_secs(self.monitor.poll_interval_secs),
            alert_threshold: Severity::from_str(&self.monitor.alert_threshold)
                .unwrap_or(Severity::Suspicious),
            fetch_limit: self.monitor.fetch_limit,
        }
    }
}

/// Agent identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the agent.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_agent_name() -> String {
    "guardian".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Monitoring session configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MonitorSectionConfig {
    /// Channel to monitor. `None` until the operator configures one.
    #[serde(default)]
    pub channel_id: Option<String>,

    /// Recipient of alert emails.
    #[serde(default)]
    pub parent_email: Option<String>,

    /// Seconds between polling ticks.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Minimum severity that triggers an alert: "suspicious" or "predatory".
    #[serde(default = "default_alert_threshold")]
    pub alert_threshold: String,

    /// Messages fetched on the first run, before any cursor exists.
    #[serde(default = "default_fetch_limit")]
    pub fetch_limit: u32,

    /// Initial backoff delay after a failed tick, in seconds.
    #[serde(default = "default_backoff_base_secs")]
    pub backoff_base_secs: u64,

    /// Backoff ceiling, in seconds.
    #[serde(default = "default_backoff_max_secs")]
    pub backoff_max_secs: u64,
}

impl Default for MonitorSectionConfig {
    fn default() -> Self {
        Self {
            channel_id: None,
            parent_email: None,
            poll_interval_secs: default_poll_interval_secs(),
            alert_threshold: default_alert_threshold(),
            fetch_limit: default_fetch_limit(),
            backoff_base_secs: default_backoff_base_secs(),
            backoff_max_secs: default_backoff_max_secs(),
        }
    }
}

fn default_poll_interval_secs() -> u64 {
    60
}

fn default_alert_threshold() -> String {
    "suspicious".to_string()
}

fn default_fetch_limit() -> u32 {
    50
}

fn default_backoff_base_secs() -> u64 {
    5
}

fn default_backoff_max_secs() -> u64 {
    300
}

/// Slack Web API configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SlackConfig {
    /// Slack bot OAuth token. `None` disables the Slack fetcher.
    #[serde(default)]
    pub bot_token: Option<String>,
}

/// Anthropic API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AnthropicConfig {
    /// Anthropic API key. `None` requires an environment variable override.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model used for classification requests.
    #[serde(default = "default_model")]
    pub model: String,

    /// Maximum tokens to generate per classification.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Anthropic API version string.
    #[serde(default = "default_api_version")]
    pub api_version: String,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            max_tokens: default_max_tokens(),
            api_version: default_api_version(),
        }
    }
}

fn default_model() -> String {
    "claude-haiku-4-5-20250901".to_string()
}

fn default_max_tokens() -> u32 {
    512
}

fn default_api_version() -> String {
    "2023-06-01".to_string()
}

/// SMTP alert delivery configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EmailConfig {
    /// SMTP relay hostname.
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,

    /// SMTP relay port.
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    /// SMTP username. `None` sends without authentication.
    #[serde(default)]
    pub smtp_username: Option<String>,

    /// SMTP password.
    #[serde(default)]
    pub smtp_password: Option<String>,

    /// From address on alert emails.
    #[serde(default = "default_from_address")]
    pub from_address: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
            smtp_username: None,
            smtp_password: None,
            from_address: default_from_address(),
        }
    }
}

fn default_smtp_host() -> String {
    "localhost".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

fn default_from_address() -> String {
    "guardian@localhost".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("guardian").join("guardian.db"))
        .and_then(|p| p.to_str().map(String::from))
        .unwrap_or_else(|| "guardian.db".to_string())
}

fn default_wal_mode() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = GuardianConfig::default();
        assert_eq!(config.agent.name, "guardian");
        assert_eq!(config.monitor.poll_interval_secs, 60);
        assert_eq!(config.monitor.alert_threshold, "suspicious");
        assert_eq!(config.monitor.fetch_limit, 50);
        assert_eq!(config.anthropic.api_version, "2023-06-01");
        assert!(config.storage.wal_mode);
    }

    #[test]
    fn monitor_config_assembles_from_sections() {
        let mut config = GuardianConfig::default();
        config.monitor.channel_id = Some("C123".into());
        config.monitor.parent_email = Some("parent@example.com".into());
        config.anthropic.api_key = Some("sk-test".into());

        let mc = config.monitor_config();
        assert_eq!(mc.channel_id, "C123");
        assert_eq!(mc.parent_email, "parent@example.com");
        assert_eq!(mc.api_key, "sk-test");
        assert_eq!(mc.poll_interval, Duration::from_secs(60));
        assert_eq!(mc.alert_threshold, Severity::Suspicious);
        assert!(mc.validate().is_ok());
    }

    #[test]
    fn monitor_config_with_missing_fields_fails_validation() {
        let config = GuardianConfig::default();
        let mc = config.monitor_config();
        assert_eq!(mc.channel_id, "");
        assert!(mc.validate().is_err());
    }

    #[test]
    fn predatory_threshold_parses() {
        let mut config = GuardianConfig::default();
        config.monitor.alert_threshold = "predatory".into();
        assert_eq!(config.monitor_config().alert_threshold, Severity::Predatory);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let toml_str = r#"
[monitor]
channel_id = "C123"
chanel_id = "typo"
"#;
        assert!(toml::from_str::<GuardianConfig>(toml_str).is_err());
    }
}
