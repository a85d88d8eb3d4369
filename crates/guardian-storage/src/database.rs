// SPDX-FileCopyrightText: 2026 Guardian Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background
//! thread. Do NOT create additional Connection instances for writes.

use std::path::Path;

use guardian_core::GuardianError;
use tracing::debug;

/// Handle to the single SQLite connection used for all Guardian persistence.
///
/// Migrations run on open; every query module accepts `&Database` and goes
/// through [`Database::connection`], so the background writer thread is the
/// single point of serialization.
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Opens (creating if necessary) the database at `path`, runs pending
    /// migrations, and applies connection PRAGMAs.
    pub async fn open(path: &str) -> Result<Self, GuardianError> {
        Self::open_with(path, true).await
    }

    /// Opens the database, optionally enabling WAL journaling.
    pub async fn open_with(path: &str, wal_mode: bool) -> Result<Self, GuardianError> {
        if let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| GuardianError::Storage {
                source: Box::new(e),
            })?;
        }

        // Migrations run on a short-lived blocking connection so refinery
        // sees a plain rusqlite handle.
        let migrate_path = path.to_string();
        tokio::task::spawn_blocking(move || -> Result<(), GuardianError> {
            let mut conn = rusqlite::Connection::open(&migrate_path).map_err(|e| {
                GuardianError::Storage {
                    source: Box::new(e),
                }
            })?;
            if wal_mode {
                conn.pragma_update(None, "journal_mode", "WAL").map_err(|e| {
                    GuardianError::Storage {
                        source: Box::new(e),
                    }
                })?;
            }
            crate::migrations::run_migrations(&mut conn)
        })
        .await
        .map_err(|e| GuardianError::Storage {
            source: Box::new(e),
        })??;

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(|e| GuardianError::Storage {
                source: Box::new(e),
            })?;

        // Per-connection PRAGMAs for the long-lived handle.
        conn.call(|conn| {
            conn.execute_batch(
                "PRAGMA synchronous = NORMAL;
                 PRAGMA foreign_keys = ON;
                 PRAGMA busy_timeout = 5000;",
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        debug!(path, wal_mode, "database opened");
        Ok(Self { conn })
    }

    /// Returns the underlying connection for query modules.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Checkpoints the WAL so all committed data reaches the main file.
    ///
    /// The connection itself closes when the handle is dropped.
    pub async fn close(&self) -> Result<(), GuardianError> {
        self.conn
            .call(|conn| {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}

/// Maps a tokio-rusqlite error into the Guardian storage error.
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error) -> GuardianError {
    GuardianError::Storage {
        source: Box::new(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn open_creates_database_file_and_schema() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("open.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();

        // The migration created our tables.
        let tables: Vec<String> = db
            .connection()
            .call(|conn| -> rusqlite::Result<Vec<String>> {
                let mut stmt = conn.prepare(
                    "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
                )?;
                let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
                let mut names = Vec::new();
                for row in rows {
                    names.push(row?);
                }
                Ok(names)
            })
            .await
            .unwrap();

        assert!(tables.contains(&"monitor_state".to_string()));
        assert!(tables.contains(&"verdicts".to_string()));
        assert!(tables.contains(&"alerts".to_string()));
        assert!(db_path.exists());
    }

    #[tokio::test]
    async fn open_is_idempotent_across_restarts() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("reopen.db");
        let path = db_path.to_str().unwrap();

        let db1 = Database::open(path).await.unwrap();
        db1.close().await.unwrap();
        drop(db1);

        // Reopening runs migrations again; refinery skips applied ones.
        let db2 = Database::open(path).await.unwrap();
        db2.close().await.unwrap();
    }

    #[tokio::test]
    async fn close_checkpoints_without_error() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("close.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        db.close().await.unwrap();
    }
}
