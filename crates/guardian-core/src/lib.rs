// SPDX-FileCopyrightText: 2026 Guardian Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Guardian monitoring agent.
//!
//! This crate provides the foundational trait definitions, error types, and
//! common types used throughout the Guardian workspace. All adapters
//! implement traits defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::GuardianError;
pub use types::{
    AdapterKind, AlertRecord, ChannelMessage, Cursor, FetchBatch, HealthStatus, HistoryEntry,
    MonitorConfig, MonitorStatus, SessionState, Severity, Verdict,
};

// Re-export all adapter traits at crate root.
pub use traits::{AlertNotifier, Classifier, MessageFetcher, ServiceAdapter, StateStore};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guardian_error_has_all_variants() {
        // Verify all 7 error variants exist and can be constructed.
        let _config = GuardianError::Config("test".into());
        let _fetch_transient = GuardianError::FetchTransient {
            message: "test".into(),
            source: None,
        };
        let _fetch_fatal = GuardianError::FetchFatal {
            message: "test".into(),
            source: None,
        };
        let _classify = GuardianError::ClassifyTransient {
            message: "test".into(),
            source: Some(Box::new(std::io::Error::other("test"))),
        };
        let _dispatch = GuardianError::DispatchFailed {
            message: "test".into(),
            source: None,
        };
        let _storage = GuardianError::Storage {
            source: Box::new(std::io::Error::other("test")),
        };
        let _internal = GuardianError::Internal("test".into());
    }

    #[test]
    fn adapter_kind_round_trips() {
        use std::str::FromStr;

        let kinds = [
            AdapterKind::Fetcher,
            AdapterKind::Classifier,
            AdapterKind::Notifier,
            AdapterKind::Store,
        ];
        for kind in &kinds {
            let s = kind.to_string();
            let parsed = AdapterKind::from_str(&s).expect("should parse back");
            assert_eq!(*kind, parsed);
        }
    }

    #[test]
    fn health_status_variants() {
        let healthy = HealthStatus::Healthy;
        let degraded = HealthStatus::Degraded("slow".into());
        let unhealthy = HealthStatus::Unhealthy("down".into());

        assert_eq!(healthy, HealthStatus::Healthy);
        assert_ne!(degraded, healthy);
        assert_ne!(unhealthy, healthy);
    }

    #[test]
    fn all_trait_modules_are_exported() {
        // This test verifies that all adapter trait modules compile and
        // are accessible through the public API. If any module is missing
        // or has a compile error, this test won't compile.
        fn _assert_service_adapter<T: ServiceAdapter>() {}
        fn _assert_fetcher<T: MessageFetcher>() {}
        fn _assert_classifier<T: Classifier>() {}
        fn _assert_notifier<T: AlertNotifier>() {}
        fn _assert_store<T: StateStore>() {}
    }
}
