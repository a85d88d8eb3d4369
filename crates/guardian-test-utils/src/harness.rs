// SPDX-FileCopyrightText: 2026 Guardian Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness helpers: temp-file SQLite store and canned configs.

use std::sync::Arc;
use std::time::Duration;

use guardian_config::model::StorageConfig;
use guardian_core::{MonitorConfig, Severity, StateStore};
use guardian_storage::SqliteStore;

/// An initialized SQLite store backed by a temp directory.
///
/// The directory lives as long as the harness value; dropping it removes
/// the database file.
pub struct TestStore {
    pub store: Arc<SqliteStore>,
    _dir: tempfile::TempDir,
}

impl TestStore {
    /// Open and initialize a fresh store in a temp directory.
    pub async fn open() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let db_path = dir.path().join("guardian-test.db");
        let store = Arc::new(SqliteStore::new(StorageConfig {
            database_path: db_path.to_str().expect("utf8 path").to_string(),
            wal_mode: true,
        }));
        store.initialize().await.expect("store init");
        Self { store, _dir: dir }
    }
}

/// A complete monitor config suitable for starting a session in tests.
pub fn test_monitor_config(channel_id: &str) -> MonitorConfig {
    MonitorConfig {
        channel_id: channel_id.to_string(),
        parent_email: "parent@example.com".to_string(),
        api_key: "sk-test".to_string(),
        poll_interval: Duration::from_millis(20),
        alert_threshold: Severity::Suspicious,
        fetch_limit: 50,
    }
}
