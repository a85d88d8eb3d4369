// SPDX-FileCopyrightText: 2026 Guardian Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Verdict log operations.

use std::str::FromStr;

use guardian_core::{
    AlertRecord, ChannelMessage, Cursor, GuardianError, HistoryEntry, Severity, Verdict,
};
use rusqlite::params;

use crate::database::Database;

/// Append a verdict with its message snapshot.
///
/// `INSERT OR IGNORE` keeps the operation idempotent: replaying a message
/// after a crash-restart never produces a second verdict row.
pub async fn record_verdict(
    db: &Database,
    channel_id: &str,
    message: &ChannelMessage,
    verdict: &Verdict,
) -> Result<(), GuardianError> {
    let channel_id = channel_id.to_string();
    let message = message.clone();
    let verdict = verdict.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT OR IGNORE INTO verdicts
                     (message_id, channel_id, sender, text, ts, severity, rationale, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))",
                params![
                    verdict.message_id,
                    channel_id,
                    message.sender,
                    message.text,
                    message.ts.0,
                    verdict.severity.to_string(),
                    verdict.rationale,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get the cached verdict for a message id, if any.
pub async fn get_verdict(
    db: &Database,
    message_id: &str,
) -> Result<Option<Verdict>, GuardianError> {
    let message_id = message_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT message_id, severity, rationale FROM verdicts WHERE message_id = ?1",
            )?;
            let result = stmt.query_row(params![message_id], |row| {
                let severity_str: String = row.get(1)?;
                let severity = parse_severity(1, &severity_str)?;
                Ok(Verdict {
                    message_id: row.get(0)?,
                    severity,
                    rationale: row.get(2)?,
                })
            });
            match result {
                Ok(verdict) => Ok(Some(verdict)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Ordered classification history for a channel, oldest first, joined with
/// the alert log.
pub async fn history(
    db: &Database,
    channel_id: &str,
) -> Result<Vec<HistoryEntry>, GuardianError> {
    let channel_id = channel_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT v.message_id, v.sender, v.text, v.ts, v.severity, v.rationale,
                        a.severity, a.sent_at
                 FROM verdicts v
                 LEFT JOIN alerts a ON a.message_id = v.message_id
                 WHERE v.channel_id = ?1
                 ORDER BY CAST(v.ts AS REAL) ASC",
            )?;
            let rows = stmt.query_map(params![channel_id], |row| {
                let message_id: String = row.get(0)?;
                let severity = parse_severity(4, &row.get::<_, String>(4)?)?;
                let alert_severity: Option<String> = row.get(6)?;
                let sent_at: Option<String> = row.get(7)?;
                let alert = match (alert_severity, sent_at) {
                    (Some(s), Some(sent_at)) => Some(AlertRecord {
                        message_id: message_id.clone(),
                        severity: parse_severity(6, &s)?,
                        sent_at,
                    }),
                    _ => None,
                };
                Ok(HistoryEntry {
                    message: ChannelMessage {
                        id: message_id.clone(),
                        sender: row.get(1)?,
                        text: row.get(2)?,
                        ts: Cursor(row.get(3)?),
                    },
                    verdict: Verdict {
                        message_id,
                        severity,
                        rationale: row.get(5)?,
                    },
                    alert,
                })
            })?;
            let mut entries = Vec::new();
            for row in rows {
                entries.push(row?);
            }
            Ok(entries)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

fn parse_severity(column: usize, value: &str) -> Result<Severity, rusqlite::Error> {
    Severity::from_str(value).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(
            column,
            rusqlite::types::Type::Text,
            Box::new(e),
        )
    })
}
