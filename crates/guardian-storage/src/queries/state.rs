// SPDX-FileCopyrightText: 2026 Guardian Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session record load and save.

use std::str::FromStr;

use guardian_core::{Cursor, GuardianError, MonitorConfig, MonitorStatus, SessionState};
use rusqlite::params;

use crate::database::Database;

/// Load the session record for a channel.
pub async fn load_state(
    db: &Database,
    channel_id: &str,
) -> Result<Option<SessionState>, GuardianError> {
    let channel_id = channel_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT channel_id, config, cursor, status, last_error, updated_at
                 FROM monitor_state WHERE channel_id = ?1",
            )?;
            let result = stmt.query_row(params![channel_id], row_to_state);
            match result {
                Ok(state) => Ok(Some(state)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Persist the full session record.
///
/// A single upsert statement: the write either commits completely or the
/// prior row remains intact.
pub async fn save_state(db: &Database, state: &SessionState) -> Result<(), GuardianError> {
    let channel_id = state.config.channel_id.clone();
    let config_json =
        serde_json::to_string(&state.config).map_err(|e| GuardianError::Storage {
            source: Box::new(e),
        })?;
    let cursor = state.cursor.as_ref().map(|c| c.0.clone());
    let status = state.status.to_string();
    let last_error = state.last_error.clone();
    let updated_at = state.updated_at.clone();

    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO monitor_state (channel_id, config, cursor, status, last_error, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(channel_id) DO UPDATE SET
                     config = excluded.config,
                     cursor = excluded.cursor,
                     status = excluded.status,
                     last_error = excluded.last_error,
                     updated_at = excluded.updated_at",
                params![channel_id, config_json, cursor, status, last_error, updated_at],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Maps a monitor_state row into a SessionState, surfacing malformed
/// persisted values as conversion errors.
fn row_to_state(row: &rusqlite::Row<'_>) -> Result<SessionState, rusqlite::Error> {
    let config_json: String = row.get(1)?;
    let config: MonitorConfig = serde_json::from_str(&config_json).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, Box::new(e))
    })?;
    let cursor: Option<String> = row.get(2)?;
    let status_str: String = row.get(3)?;
    let status = MonitorStatus::from_str(&status_str).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(SessionState {
        config,
        cursor: cursor.map(Cursor),
        status,
        last_error: row.get(4)?,
        updated_at: row.get(5)?,
    })
}
