// SPDX-FileCopyrightText: 2026 Guardian Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the StateStore trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use guardian_config::model::StorageConfig;
use guardian_core::{
    AdapterKind, AlertRecord, ChannelMessage, GuardianError, HealthStatus, HistoryEntry,
    ServiceAdapter, SessionState, StateStore, Verdict,
};

use crate::database::Database;
use crate::queries;

/// SQLite-backed state store.
///
/// Wraps a [`Database`] handle and delegates all query operations to the
/// typed query modules. The database is lazily initialized on the first
/// call to [`StateStore::initialize`].
pub struct SqliteStore {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStore {
    /// Create a new SqliteStore with the given configuration.
    ///
    /// The database connection is not opened until [`StateStore::initialize`]
    /// is called.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Returns a reference to the underlying Database, or an error if not
    /// initialized.
    fn db(&self) -> Result<&Database, GuardianError> {
        self.db.get().ok_or_else(|| GuardianError::Storage {
            source: "store not initialized -- call initialize() first".into(),
        })
    }
}

#[async_trait]
impl ServiceAdapter for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn kind(&self) -> AdapterKind {
        AdapterKind::Store
    }

    async fn health_check(&self) -> Result<HealthStatus, GuardianError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), GuardianError> {
        // Shutdown delegates to close if the DB was initialized.
        if let Some(db) = self.db.get() {
            db.close().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl StateStore for SqliteStore {
    async fn initialize(&self) -> Result<(), GuardianError> {
        let db = Database::open_with(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| GuardianError::Storage {
            source: "store already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite store initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), GuardianError> {
        self.db()?.close().await
    }

    async fn load_state(
        &self,
        channel_id: &str,
    ) -> Result<Option<SessionState>, GuardianError> {
        queries::state::load_state(self.db()?, channel_id).await
    }

    async fn save_state(&self, state: &SessionState) -> Result<(), GuardianError> {
        queries::state::save_state(self.db()?, state).await
    }

    async fn record_verdict(
        &self,
        channel_id: &str,
        message: &ChannelMessage,
        verdict: &Verdict,
    ) -> Result<(), GuardianError> {
        queries::verdicts::record_verdict(self.db()?, channel_id, message, verdict).await
    }

    async fn get_verdict(
        &self,
        message_id: &str,
    ) -> Result<Option<Verdict>, GuardianError> {
        queries::verdicts::get_verdict(self.db()?, message_id).await
    }

    async fn record_alert(
        &self,
        channel_id: &str,
        alert: &AlertRecord,
    ) -> Result<(), GuardianError> {
        queries::alerts::record_alert(self.db()?, channel_id, alert).await
    }

    async fn has_alert(&self, message_id: &str) -> Result<bool, GuardianError> {
        queries::alerts::has_alert(self.db()?, message_id).await
    }

    async fn history(&self, channel_id: &str) -> Result<Vec<HistoryEntry>, GuardianError> {
        queries::verdicts::history(self.db()?, channel_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use guardian_core::{Cursor, MonitorConfig, MonitorStatus, Severity};
    use tempfile::tempdir;

    fn make_config(path: &str) -> StorageConfig {
        StorageConfig {
            database_path: path.to_string(),
            wal_mode: true,
        }
    }

    fn make_state(channel_id: &str) -> SessionState {
        SessionState::stopped_default(MonitorConfig {
            channel_id: channel_id.to_string(),
            parent_email: "parent@example.com".to_string(),
            api_key: "sk-test".to_string(),
            poll_interval: Duration::from_secs(60),
            alert_threshold: Severity::Suspicious,
            fetch_limit: 50,
        })
    }

    #[tokio::test]
    async fn sqlite_store_implements_service_adapter() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let store = SqliteStore::new(make_config(db_path.to_str().unwrap()));

        assert_eq!(store.name(), "sqlite");
        assert_eq!(store.version(), semver::Version::new(0, 1, 0));
        assert_eq!(store.kind(), AdapterKind::Store);
    }

    #[tokio::test]
    async fn initialize_opens_database_at_configured_path() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("init_test.db");
        let store = SqliteStore::new(make_config(db_path.to_str().unwrap()));

        store.initialize().await.unwrap();
        assert!(db_path.exists(), "database file should be created");
    }

    #[tokio::test]
    async fn initialize_twice_returns_error() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("double_init.db");
        let store = SqliteStore::new(make_config(db_path.to_str().unwrap()));

        store.initialize().await.unwrap();
        assert!(store.initialize().await.is_err(), "second initialize should fail");
    }

    #[tokio::test]
    async fn health_check_fails_when_not_initialized() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("no_init.db");
        let store = SqliteStore::new(make_config(db_path.to_str().unwrap()));

        assert!(store.health_check().await.is_err());
    }

    #[tokio::test]
    async fn health_check_returns_healthy_when_initialized() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("health.db");
        let store = SqliteStore::new(make_config(db_path.to_str().unwrap()));

        store.initialize().await.unwrap();
        assert_eq!(store.health_check().await.unwrap(), HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn full_session_lifecycle_through_adapter() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("lifecycle.db");
        let store = SqliteStore::new(make_config(db_path.to_str().unwrap()));
        store.initialize().await.unwrap();

        // No state yet.
        assert!(store.load_state("C123").await.unwrap().is_none());

        // Save the stopped default.
        let mut state = make_state("C123");
        store.save_state(&state).await.unwrap();
        let loaded = store.load_state("C123").await.unwrap().unwrap();
        assert_eq!(loaded.status, MonitorStatus::Stopped);

        // Advance cursor and status.
        state.status = MonitorStatus::Running;
        state.cursor = Some(Cursor("1712345678.000100".to_string()));
        store.save_state(&state).await.unwrap();

        let loaded = store.load_state("C123").await.unwrap().unwrap();
        assert_eq!(loaded.status, MonitorStatus::Running);
        assert_eq!(loaded.cursor, Some(Cursor("1712345678.000100".to_string())));

        // Record a verdict and an alert, then read history.
        let msg = ChannelMessage {
            id: "1712345678.000100".to_string(),
            sender: "U42".to_string(),
            text: "hey kid, don't tell your parents".to_string(),
            ts: Cursor("1712345678.000100".to_string()),
        };
        let verdict = Verdict {
            message_id: msg.id.clone(),
            severity: Severity::Predatory,
            rationale: "secrecy request".to_string(),
        };
        store.record_verdict("C123", &msg, &verdict).await.unwrap();

        assert!(!store.has_alert(&msg.id).await.unwrap());
        let alert = AlertRecord {
            message_id: msg.id.clone(),
            severity: Severity::Predatory,
            sent_at: "2026-01-01T00:00:00+00:00".to_string(),
        };
        store.record_alert("C123", &alert).await.unwrap();
        assert!(store.has_alert(&msg.id).await.unwrap());

        let entries = store.history("C123").await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].verdict.severity, Severity::Predatory);
        assert_eq!(
            entries[0].alert.as_ref().map(|a| a.message_id.as_str()),
            Some(msg.id.as_str())
        );

        store.close().await.unwrap();
    }

    #[tokio::test]
    async fn state_survives_reopen() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("restart.db");
        let path = db_path.to_str().unwrap();

        {
            let store = SqliteStore::new(make_config(path));
            store.initialize().await.unwrap();
            let mut state = make_state("C123");
            state.status = MonitorStatus::Running;
            state.cursor = Some(Cursor("42.0".to_string()));
            store.save_state(&state).await.unwrap();
            store.shutdown().await.unwrap();
        }

        // A fresh store over the same file sees the committed state.
        let store = SqliteStore::new(make_config(path));
        store.initialize().await.unwrap();
        let loaded = store.load_state("C123").await.unwrap().unwrap();
        assert_eq!(loaded.cursor, Some(Cursor("42.0".to_string())));
        assert_eq!(loaded.status, MonitorStatus::Running);
    }
}
