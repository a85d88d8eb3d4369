// SPDX-FileCopyrightText: 2026 Guardian Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Monitoring loop and session state machine for the Guardian agent.
//!
//! The [`MonitorLoop`] is the central coordinator that:
//! - Wakes on a polling interval and fetches messages past the cursor
//! - Classifies each new message (skipping cached verdicts)
//! - Dispatches alerts for verdicts at or above the threshold
//! - Commits the cursor and status to the state store after each tick
//! - Recovers from transient failures with exponential backoff
//! - Handles graceful shutdown via a cancellation token
//!
//! The loop is the sole writer of [`SessionState`]; every mutation is
//! persisted so a process restart resumes from the last committed cursor.

pub mod backoff;
pub mod dispatcher;
pub mod service;
pub mod shutdown;

pub use backoff::Backoff;
pub use dispatcher::{AlertDispatcher, DispatchOutcome};
pub use service::MonitorService;

use std::sync::Arc;

use guardian_core::{
    Classifier, GuardianError, MessageFetcher, MonitorConfig, MonitorStatus, SessionState,
    StateStore,
};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Counters summarizing one completed tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickOutcome {
    /// Messages examined this tick (including cached verdicts).
    pub scanned: usize,
    /// Alerts delivered this tick.
    pub alerted: usize,
}

/// The monitoring loop driving fetch, classify, dispatch, and persist.
pub struct MonitorLoop {
    fetcher: Arc<dyn MessageFetcher + Send + Sync>,
    classifier: Arc<dyn Classifier + Send + Sync>,
    dispatcher: AlertDispatcher,
    store: Arc<dyn StateStore + Send + Sync>,
    state: SessionState,
    backoff: Backoff,
}

impl MonitorLoop {
    /// Creates a monitoring loop for one channel, resuming from persisted
    /// state where it exists.
    ///
    /// The prior cursor is carried over so a restart never re-alerts on
    /// already-processed messages; the supplied config replaces the
    /// persisted one (reconfiguration happens only through stop/start).
    /// An unreadable persisted record falls back to the stopped default
    /// rather than refusing to start.
    pub async fn new(
        fetcher: Arc<dyn MessageFetcher + Send + Sync>,
        classifier: Arc<dyn Classifier + Send + Sync>,
        dispatcher: AlertDispatcher,
        store: Arc<dyn StateStore + Send + Sync>,
        config: MonitorConfig,
        backoff: Backoff,
    ) -> Self {
        let state = match store.load_state(&config.channel_id).await {
            Ok(Some(prior)) => {
                debug!(
                    channel_id = config.channel_id.as_str(),
                    cursor = prior.cursor.as_ref().map(|c| c.0.as_str()),
                    "resuming from persisted session state"
                );
                SessionState {
                    config: config.clone(),
                    cursor: prior.cursor,
                    status: MonitorStatus::Stopped,
                    last_error: prior.last_error,
                    updated_at: chrono::Utc::now().to_rfc3339(),
                }
            }
            Ok(None) => SessionState::stopped_default(config.clone()),
            Err(e) => {
                warn!(error = %e, "persisted session state unreadable, starting fresh");
                SessionState::stopped_default(config.clone())
            }
        };

        Self {
            fetcher,
            classifier,
            dispatcher,
            store,
            state,
            backoff,
        }
    }

    /// Immutable snapshot of the current session state.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Runs the monitoring loop until the cancellation token is triggered.
    ///
    /// The loop:
    /// 1. Transitions `Stopped -> Starting -> Running`, validating config
    /// 2. Ticks on the poll interval; no two ticks overlap
    /// 3. On a retryable failure, enters `Error` and backs off before
    ///    re-entering `Running` from the same cursor
    /// 4. On a fatal failure, stays in `Error` until stopped
    /// 5. On cancellation, transitions to `Stopped` at the next safe point
    pub async fn run(&mut self, cancel: CancellationToken) -> Result<(), GuardianError> {
        if let Err(e) = self.enter_running().await {
            error!(error = %e, "monitor failed to start");
            return Err(e);
        }

        let mut interval = tokio::time::interval(self.state.config.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    match self.tick().await {
                        Ok(outcome) => {
                            self.backoff.reset();
                            debug!(
                                scanned = outcome.scanned,
                                alerted = outcome.alerted,
                                cursor = self.state.cursor.as_ref().map(|c| c.0.as_str()),
                                "tick complete"
                            );
                        }
                        Err(e) if e.is_retryable() => {
                            warn!(error = %e, "tick failed, entering error state");
                            self.set_error(e.to_string()).await;
                            let delay = self.backoff.next_delay();
                            info!(delay_secs = delay.as_secs(), "backing off before retry");
                            tokio::select! {
                                _ = tokio::time::sleep(delay) => {
                                    // Re-enter Running from the committed
                                    // cursor; last_error stays readable
                                    // until a tick succeeds.
                                    self.set_status(MonitorStatus::Running).await;
                                }
                                _ = cancel.cancelled() => break,
                            }
                        }
                        Err(e) => {
                            error!(error = %e, "fatal error, polling paused until stop");
                            self.set_error(e.to_string()).await;
                            cancel.cancelled().await;
                            break;
                        }
                    }
                }
                _ = cancel.cancelled() => {
                    info!("stop requested, leaving monitor loop");
                    break;
                }
            }
        }

        self.set_status(MonitorStatus::Stopped).await;
        info!(
            channel_id = self.state.config.channel_id.as_str(),
            "monitor stopped"
        );
        Ok(())
    }

    /// `Stopped -> Starting -> Running`, persisting each transition.
    ///
    /// Config validation failure moves to `Error` with a
    /// configuration-incomplete reason so the operator surface can show it.
    async fn enter_running(&mut self) -> Result<(), GuardianError> {
        self.state.status = MonitorStatus::Starting;
        self.state.last_error = None;
        self.persist_state().await?;
        info!(
            channel_id = self.state.config.channel_id.as_str(),
            "monitor starting"
        );

        if let Err(e) = self.state.config.validate() {
            self.set_error(e.to_string()).await;
            return Err(e);
        }

        self.state.status = MonitorStatus::Running;
        self.persist_state().await?;
        info!(
            poll_interval_secs = self.state.config.poll_interval.as_secs(),
            threshold = %self.state.config.alert_threshold,
            "monitor running"
        );
        Ok(())
    }

    /// One fetch-classify-alert-persist cycle.
    ///
    /// The cursor commits only after the whole batch is processed; any
    /// error aborts the tick with the cursor at its last committed value,
    /// so the failed message is re-fetched and re-attempted next tick.
    /// Verdicts and alert records persist per message as produced, which
    /// keeps the replay after a mid-batch crash idempotent.
    async fn tick(&mut self) -> Result<TickOutcome, GuardianError> {
        let channel_id = self.state.config.channel_id.clone();
        let batch = self
            .fetcher
            .fetch_since(&channel_id, self.state.cursor.as_ref())
            .await?;

        let mut outcome = TickOutcome::default();
        for message in &batch.messages {
            let verdict = match self.store.get_verdict(&message.id).await? {
                Some(cached) => {
                    debug!(message_id = message.id.as_str(), "verdict cached, skipping classify");
                    cached
                }
                None => {
                    let verdict = self.classifier.classify(message).await?;
                    self.store
                        .record_verdict(&channel_id, message, &verdict)
                        .await?;
                    verdict
                }
            };
            outcome.scanned += 1;

            if verdict.severity >= self.state.config.alert_threshold {
                let dispatched = self
                    .dispatcher
                    .dispatch(&self.state.config, message, &verdict)
                    .await?;
                if dispatched == DispatchOutcome::Sent {
                    outcome.alerted += 1;
                }
            }
        }

        if let Some(cursor) = batch.cursor {
            self.state.cursor = Some(cursor);
        }
        self.state.status = MonitorStatus::Running;
        self.state.last_error = None;
        self.persist_state().await?;

        if outcome.scanned > 0 {
            info!(
                scanned = outcome.scanned,
                alerted = outcome.alerted,
                "processed new messages"
            );
        }
        Ok(outcome)
    }

    /// Sets the status, keeping `last_error` readable, and persists.
    async fn set_status(&mut self, status: MonitorStatus) {
        self.state.status = status;
        if let Err(e) = self.persist_state().await {
            error!(error = %e, "failed to persist status transition");
        }
    }

    /// Enters `Error` with a reason and persists.
    async fn set_error(&mut self, reason: String) {
        self.state.status = MonitorStatus::Error;
        self.state.last_error = Some(reason);
        if let Err(e) = self.persist_state().await {
            error!(error = %e, "failed to persist error state");
        }
    }

    async fn persist_state(&mut self) -> Result<(), GuardianError> {
        self.state.updated_at = chrono::Utc::now().to_rfc3339();
        self.store.save_state(&self.state).await
    }
}
