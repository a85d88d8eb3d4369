// SPDX-FileCopyrightText: 2026 Guardian Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Alert log operations.

use guardian_core::{AlertRecord, GuardianError};
use rusqlite::params;

use crate::database::Database;

/// Append an alert record.
///
/// `INSERT OR IGNORE` enforces at-most-one delivered alert per message id,
/// guarding against duplicate alerts from cursor replay after a crash.
pub async fn record_alert(
    db: &Database,
    channel_id: &str,
    alert: &AlertRecord,
) -> Result<(), GuardianError> {
    let channel_id = channel_id.to_string();
    let alert = alert.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT OR IGNORE INTO alerts (message_id, channel_id, severity, sent_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    alert.message_id,
                    channel_id,
                    alert.severity.to_string(),
                    alert.sent_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Returns true if an alert was already delivered for this message id.
pub async fn has_alert(db: &Database, message_id: &str) -> Result<bool, GuardianError> {
    let message_id = message_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt =
                conn.prepare("SELECT EXISTS(SELECT 1 FROM alerts WHERE message_id = ?1)")?;
            let exists: bool = stmt.query_row(params![message_id], |row| row.get(0))?;
            Ok(exists)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
