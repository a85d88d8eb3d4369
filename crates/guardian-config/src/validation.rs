// SPDX-FileCopyrightText: 2026 Guardian Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as parseable severity names, positive intervals, and
//! non-empty paths. Completeness of the monitoring fields themselves
//! (channel id, parent email, API key) is deliberately NOT checked here --
//! that belongs to the Starting transition, so a partially configured
//! agent can still run `status` and `history`.

use std::str::FromStr;

use guardian_core::Severity;

use crate::diagnostic::ConfigError;
use crate::model::GuardianConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &GuardianConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if config.monitor.poll_interval_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "monitor.poll_interval_secs must be at least 1".to_string(),
        });
    }

    match Severity::from_str(&config.monitor.alert_threshold) {
        Ok(Severity::Safe) | Err(_) => {
            errors.push(ConfigError::Validation {
                message: format!(
                    "monitor.alert_threshold must be `suspicious` or `predatory`, got `{}`",
                    config.monitor.alert_threshold
                ),
            });
        }
        Ok(_) => {}
    }

    if config.monitor.fetch_limit == 0 || config.monitor.fetch_limit > 1000 {
        errors.push(ConfigError::Validation {
            message: format!(
                "monitor.fetch_limit must be between 1 and 1000, got {}",
                config.monitor.fetch_limit
            ),
        });
    }

    if config.monitor.backoff_base_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "monitor.backoff_base_secs must be at least 1".to_string(),
        });
    }

    if config.monitor.backoff_max_secs < config.monitor.backoff_base_secs {
        errors.push(ConfigError::Validation {
            message: format!(
                "monitor.backoff_max_secs ({}) must not be less than backoff_base_secs ({})",
                config.monitor.backoff_max_secs, config.monitor.backoff_base_secs
            ),
        });
    }

    if let Some(email) = &config.monitor.parent_email
        && !email.trim().is_empty()
        && !email.contains('@')
    {
        errors.push(ConfigError::Validation {
            message: format!("monitor.parent_email `{email}` is not a valid email address"),
        });
    }

    if config.email.smtp_host.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "email.smtp_host must not be empty".to_string(),
        });
    }

    if config.email.smtp_port == 0 {
        errors.push(ConfigError::Validation {
            message: "email.smtp_port must not be 0".to_string(),
        });
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        let config = GuardianConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn empty_database_path_fails_validation() {
        let mut config = GuardianConfig::default();
        config.storage.database_path = "".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(
            |e| matches!(e, ConfigError::Validation { message } if message.contains("database_path"))
        ));
    }

    #[test]
    fn zero_poll_interval_fails_validation() {
        let mut config = GuardianConfig::default();
        config.monitor.poll_interval_secs = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(
            |e| matches!(e, ConfigError::Validation { message } if message.contains("poll_interval_secs"))
        ));
    }

    #[test]
    fn safe_threshold_fails_validation() {
        let mut config = GuardianConfig::default();
        config.monitor.alert_threshold = "safe".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn unknown_threshold_fails_validation() {
        let mut config = GuardianConfig::default();
        config.monitor.alert_threshold = "severe".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(
            |e| matches!(e, ConfigError::Validation { message } if message.contains("alert_threshold"))
        ));
    }

    #[test]
    fn predatory_threshold_passes() {
        let mut config = GuardianConfig::default();
        config.monitor.alert_threshold = "predatory".to_string();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn oversized_fetch_limit_fails_validation() {
        let mut config = GuardianConfig::default();
        config.monitor.fetch_limit = 5000;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn backoff_max_below_base_fails_validation() {
        let mut config = GuardianConfig::default();
        config.monitor.backoff_base_secs = 60;
        config.monitor.backoff_max_secs = 10;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn malformed_parent_email_fails_validation() {
        let mut config = GuardianConfig::default();
        config.monitor.parent_email = Some("nobody".to_string());
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(
            |e| matches!(e, ConfigError::Validation { message } if message.contains("parent_email"))
        ));
    }

    #[test]
    fn unset_parent_email_is_allowed() {
        // Completeness is enforced at Starting, not at load time.
        let config = GuardianConfig::default();
        assert!(config.monitor.parent_email.is_none());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn multiple_errors_are_collected() {
        let mut config = GuardianConfig::default();
        config.storage.database_path = "".to_string();
        config.monitor.poll_interval_secs = 0;
        config.email.smtp_port = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.len() >= 3);
    }
}
