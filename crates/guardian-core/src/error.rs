// SPDX-FileCopyrightText: 2026 Guardian Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Guardian monitoring agent.

use thiserror::Error;

/// The primary error type used across all Guardian adapter traits and the
/// monitoring loop.
#[derive(Debug, Error)]
pub enum GuardianError {
    /// Configuration errors (missing required fields, malformed values).
    /// Never retried: the operator must correct the configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Transient fetch failure (network outage, rate limit). The tick aborts
    /// and the fetch is retried from the same cursor on a later tick.
    #[error("fetch error (transient): {message}")]
    FetchTransient {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Fatal fetch failure (invalid, deleted, or inaccessible channel).
    #[error("fetch error (fatal): {message}")]
    FetchFatal {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Classification backend unavailable. Always retryable: the message is
    /// neither marked safe nor alerted, and must be re-attempted later.
    #[error("classify error: {message}")]
    ClassifyTransient {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Alert delivery failed. Retryable; no AlertRecord is written, so a
    /// later tick re-attempts the send.
    #[error("dispatch error: {message}")]
    DispatchFailed {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Storage backend errors (database connection, query failure,
    /// serialization). Retryable with backoff; repeated failures escalate
    /// the loop to the Error state.
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GuardianError {
    /// Whether the monitoring loop may re-attempt the failed operation on a
    /// later tick (with backoff), as opposed to requiring operator action.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GuardianError::FetchTransient { .. }
                | GuardianError::ClassifyTransient { .. }
                | GuardianError::DispatchFailed { .. }
                | GuardianError::Storage { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_variants_are_retryable() {
        let fetch = GuardianError::FetchTransient {
            message: "timeout".into(),
            source: None,
        };
        let classify = GuardianError::ClassifyTransient {
            message: "overloaded".into(),
            source: None,
        };
        let dispatch = GuardianError::DispatchFailed {
            message: "smtp refused".into(),
            source: None,
        };
        let storage = GuardianError::Storage {
            source: Box::new(std::io::Error::other("disk full")),
        };
        assert!(fetch.is_retryable());
        assert!(classify.is_retryable());
        assert!(dispatch.is_retryable());
        assert!(storage.is_retryable());
    }

    #[test]
    fn fatal_variants_are_not_retryable() {
        let config = GuardianError::Config("monitor.channel_id is empty".into());
        let fetch = GuardianError::FetchFatal {
            message: "channel_not_found".into(),
            source: None,
        };
        let internal = GuardianError::Internal("unreachable".into());
        assert!(!config.is_retryable());
        assert!(!fetch.is_retryable());
        assert!(!internal.is_retryable());
    }

    #[test]
    fn display_includes_message() {
        let err = GuardianError::FetchTransient {
            message: "connection reset".into(),
            source: None,
        };
        assert!(err.to_string().contains("connection reset"));
    }
}
