// SPDX-FileCopyrightText: 2026 Guardian Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./guardian.toml` > `~/.config/guardian/guardian.toml`
//! > `/etc/guardian/guardian.toml` with environment variable overrides via
//! `GUARDIAN_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::GuardianConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/guardian/guardian.toml` (system-wide)
/// 3. `~/.config/guardian/guardian.toml` (user XDG config)
/// 4. `./guardian.toml` (local directory)
/// 5. `GUARDIAN_*` environment variables
pub fn load_config() -> Result<GuardianConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(GuardianConfig::default()))
        .merge(Toml::file("/etc/guardian/guardian.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("guardian/guardian.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("guardian.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<GuardianConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(GuardianConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<GuardianConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(GuardianConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `GUARDIAN_SLACK_BOT_TOKEN` must map to
/// `slack.bot_token`, not `slack.bot.token`.
fn env_provider() -> Env {
    Env::prefixed("GUARDIAN_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: GUARDIAN_MONITOR_CHANNEL_ID -> "monitor_channel_id"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("agent_", "agent.", 1)
            .replacen("monitor_", "monitor.", 1)
            .replacen("slack_", "slack.", 1)
            .replacen("anthropic_", "anthropic.", 1)
            .replacen("email_", "email.", 1)
            .replacen("storage_", "storage.", 1);
        mapped.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_toml_overrides_defaults() {
        let config = load_config_from_str(
            r#"
[monitor]
channel_id = "C999"
poll_interval_secs = 15
"#,
        )
        .unwrap();
        assert_eq!(config.monitor.channel_id.as_deref(), Some("C999"));
        assert_eq!(config.monitor.poll_interval_secs, 15);
        // Untouched sections keep their defaults.
        assert_eq!(config.agent.name, "guardian");
    }

    #[test]
    fn empty_input_yields_defaults() {
        let config = load_config_from_str("").unwrap();
        assert!(config.monitor.channel_id.is_none());
        assert_eq!(config.monitor.fetch_limit, 50);
    }
}
