// SPDX-FileCopyrightText: 2026 Guardian Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `guardian history` command implementation.
//!
//! Prints the ordered classification history with alert markers.

use std::sync::Arc;

use guardian_config::GuardianConfig;
use guardian_core::{GuardianError, StateStore};
use guardian_storage::SqliteStore;

/// Runs the `guardian history` command.
pub async fn run_history(config: GuardianConfig) -> Result<(), GuardianError> {
    let Some(channel_id) = config.monitor.channel_id.clone() else {
        println!("no channel configured (set monitor.channel_id)");
        return Ok(());
    };

    let store = Arc::new(SqliteStore::new(config.storage.clone()));
    store.initialize().await?;

    let entries = store.history(&channel_id).await?;
    if entries.is_empty() {
        println!("no messages classified yet for channel {channel_id}");
        return Ok(());
    }

    for entry in entries {
        let alert_marker = match entry.alert {
            Some(alert) => format!("ALERTED {}", alert.sent_at),
            None => "-".to_string(),
        };
        println!(
            "{}  [{:<10}]  {}  <{}> {}",
            entry.message.ts.0,
            entry.verdict.severity.to_string(),
            alert_marker,
            entry.message.sender,
            truncate(&entry.message.text, 80),
        );
    }

    Ok(())
}

/// Truncates display text at a character boundary.
fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_chars).collect();
        format!("{truncated}...")
    }
}
