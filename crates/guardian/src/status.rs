// SPDX-FileCopyrightText: 2026 Guardian Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `guardian status` command implementation.
//!
//! Reads the persisted session record and prints a redacted summary.

use std::sync::Arc;

use guardian_config::GuardianConfig;
use guardian_core::{GuardianError, StateStore};
use guardian_storage::SqliteStore;

/// Runs the `guardian status` command.
pub async fn run_status(config: GuardianConfig) -> Result<(), GuardianError> {
    let Some(channel_id) = config.monitor.channel_id.clone() else {
        println!("no channel configured (set monitor.channel_id)");
        return Ok(());
    };

    let store = Arc::new(SqliteStore::new(config.storage.clone()));
    store.initialize().await?;

    match store.load_state(&channel_id).await? {
        Some(state) => {
            let config = state.config.redacted();
            println!("channel:       {}", config.channel_id);
            println!("status:        {}", state.status);
            println!(
                "cursor:        {}",
                state
                    .cursor
                    .map(|c| c.0)
                    .unwrap_or_else(|| "(none)".to_string())
            );
            println!(
                "last error:    {}",
                state.last_error.unwrap_or_else(|| "(none)".to_string())
            );
            println!("parent email:  {}", config.parent_email);
            println!("threshold:     {}", config.alert_threshold);
            println!("poll interval: {}s", config.poll_interval.as_secs());
            println!("api key:       {}", config.api_key);
            println!("updated:       {}", state.updated_at);
        }
        None => {
            println!("no session recorded for channel {channel_id}");
        }
    }

    Ok(())
}
