// SPDX-FileCopyrightText: 2026 Guardian Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `guardian serve` command implementation.
//!
//! Wires the Slack fetcher, Anthropic classifier, SMTP notifier, and SQLite
//! store into the monitoring loop, then runs until a shutdown signal.

use std::sync::Arc;
use std::time::Duration;

use guardian_anthropic::AnthropicClassifier;
use guardian_config::GuardianConfig;
use guardian_core::{GuardianError, MonitorStatus, ServiceAdapter, StateStore};
use guardian_email::EmailNotifier;
use guardian_monitor::{MonitorService, shutdown};
use guardian_slack::SlackFetcher;
use guardian_storage::SqliteStore;
use tracing::{error, info};

/// Runs the `guardian serve` command.
///
/// Initializes all adapters, starts the monitoring session, and waits for
/// SIGINT/SIGTERM. The loop stops at its next safe point and the last
/// committed cursor is preserved for the next start.
pub async fn run_serve(config: GuardianConfig) -> Result<(), GuardianError> {
    init_tracing(&config.agent.log_level);

    info!("starting guardian serve");

    // Initialize storage.
    let store = Arc::new(SqliteStore::new(config.storage.clone()));
    store.initialize().await?;

    let monitor_config = config.monitor_config();

    // Crash recovery: a session left Running/Starting by a dead process is
    // marked Stopped; the loop resumes from the persisted cursor.
    mark_stale_session(store.as_ref(), &monitor_config.channel_id).await?;

    // Initialize the Slack fetcher.
    let fetcher = SlackFetcher::new(&config.slack, monitor_config.fetch_limit).map_err(|e| {
        error!(error = %e, "failed to initialize Slack fetcher");
        eprintln!(
            "error: Slack bot token required. Set slack.bot_token in guardian.toml or GUARDIAN_SLACK_BOT_TOKEN."
        );
        e
    })?;

    // Initialize the Anthropic classifier.
    let classifier = AnthropicClassifier::new(&config.anthropic).map_err(|e| {
        error!(error = %e, "failed to initialize Anthropic classifier");
        eprintln!(
            "error: Anthropic API key required. Set anthropic.api_key in guardian.toml or GUARDIAN_ANTHROPIC_API_KEY."
        );
        e
    })?;

    // Initialize the SMTP notifier.
    let notifier = EmailNotifier::new(&config.email).map_err(|e| {
        error!(error = %e, "failed to initialize SMTP notifier");
        e
    })?;

    let mut service = MonitorService::new(
        Arc::new(fetcher),
        Arc::new(classifier),
        Arc::new(notifier),
        store.clone(),
        Duration::from_secs(config.monitor.backoff_base_secs),
        Duration::from_secs(config.monitor.backoff_max_secs),
    );

    // Install signal handler and start the session.
    let cancel = shutdown::install_signal_handler();
    service.start(monitor_config).await?;

    // Wait for shutdown signal, then stop at the next safe point.
    cancel.cancelled().await;
    service.stop().await?;
    store.shutdown().await?;

    info!("guardian serve shutdown complete");
    Ok(())
}

/// Marks a session left in a live status by a previous process as Stopped.
///
/// Handles the case where the process was killed without graceful
/// shutdown. The committed cursor is untouched, so no message is
/// reprocessed beyond the idempotent replay window.
async fn mark_stale_session(
    store: &dyn StateStore,
    channel_id: &str,
) -> Result<(), GuardianError> {
    if channel_id.is_empty() {
        return Ok(());
    }
    if let Some(mut state) = store.load_state(channel_id).await?
        && matches!(state.status, MonitorStatus::Running | MonitorStatus::Starting)
    {
        info!(
            channel_id,
            status = %state.status,
            "marking stale session from previous process as stopped"
        );
        state.status = MonitorStatus::Stopped;
        state.updated_at = chrono::Utc::now().to_rfc3339();
        store.save_state(&state).await?;
    }
    Ok(())
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("guardian={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
