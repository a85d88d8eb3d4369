// SPDX-FileCopyrightText: 2026 Guardian Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Operator surface over the monitoring loop.
//!
//! [`MonitorService`] is what the shell (CLI or a future dashboard) talks
//! to: start a session, stop it, read a redacted status snapshot, read the
//! classification history. The loop itself stays the sole writer of
//! session state; this surface only spawns it and reads the store.

use std::sync::Arc;
use std::time::Duration;

use guardian_core::{
    AlertNotifier, Classifier, GuardianError, HistoryEntry, MessageFetcher, MonitorConfig,
    SessionState, StateStore,
};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::backoff::Backoff;
use crate::dispatcher::AlertDispatcher;
use crate::MonitorLoop;

/// Handle to one spawned monitoring session.
struct RunningSession {
    channel_id: String,
    cancel: CancellationToken,
    handle: tokio::task::JoinHandle<Result<(), GuardianError>>,
}

/// Operator surface: start/stop/status/history for one monitoring session.
pub struct MonitorService {
    fetcher: Arc<dyn MessageFetcher + Send + Sync>,
    classifier: Arc<dyn Classifier + Send + Sync>,
    notifier: Arc<dyn AlertNotifier + Send + Sync>,
    store: Arc<dyn StateStore + Send + Sync>,
    backoff_base: Duration,
    backoff_max: Duration,
    running: Option<RunningSession>,
}

impl MonitorService {
    /// Creates the service over the four adapters.
    pub fn new(
        fetcher: Arc<dyn MessageFetcher + Send + Sync>,
        classifier: Arc<dyn Classifier + Send + Sync>,
        notifier: Arc<dyn AlertNotifier + Send + Sync>,
        store: Arc<dyn StateStore + Send + Sync>,
        backoff_base: Duration,
        backoff_max: Duration,
    ) -> Self {
        Self {
            fetcher,
            classifier,
            notifier,
            store,
            backoff_base,
            backoff_max,
            running: None,
        }
    }

    /// Spawns the monitoring loop for the given configuration.
    ///
    /// One session per service: starting while a session is active is an
    /// error (stop, reconfigure, start). Configuration completeness is
    /// validated by the loop's Starting transition and surfaced via
    /// [`MonitorService::status`].
    pub async fn start(&mut self, config: MonitorConfig) -> Result<(), GuardianError> {
        if self.running.is_some() {
            return Err(GuardianError::Config(
                "a monitoring session is already active; stop it before reconfiguring".into(),
            ));
        }

        let channel_id = config.channel_id.clone();
        let dispatcher = AlertDispatcher::new(self.notifier.clone(), self.store.clone());
        let mut monitor = MonitorLoop::new(
            self.fetcher.clone(),
            self.classifier.clone(),
            dispatcher,
            self.store.clone(),
            config,
            Backoff::new(self.backoff_base, self.backoff_max),
        )
        .await;

        let cancel = CancellationToken::new();
        let run_cancel = cancel.clone();
        let handle = tokio::spawn(async move { monitor.run(run_cancel).await });

        info!(channel_id = channel_id.as_str(), "monitoring session started");
        self.running = Some(RunningSession {
            channel_id,
            cancel,
            handle,
        });
        Ok(())
    }

    /// Stops the active session at its next safe point and waits for the
    /// loop to finish. No-op when nothing is running.
    pub async fn stop(&mut self) -> Result<(), GuardianError> {
        let Some(session) = self.running.take() else {
            return Ok(());
        };

        session.cancel.cancel();
        match session.handle.await {
            Ok(Ok(())) => {
                info!(
                    channel_id = session.channel_id.as_str(),
                    "monitoring session stopped"
                );
            }
            Ok(Err(e)) => {
                // The loop already persisted and logged the failure; stop
                // itself still succeeds.
                error!(error = %e, "monitoring session ended with error");
            }
            Err(e) => {
                return Err(GuardianError::Internal(format!(
                    "monitor task panicked: {e}"
                )));
            }
        }
        Ok(())
    }

    /// Whether a session task is currently spawned.
    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Redacted snapshot of the persisted session state for a channel.
    pub async fn status(
        &self,
        channel_id: &str,
    ) -> Result<Option<SessionState>, GuardianError> {
        let state = self.store.load_state(channel_id).await?;
        Ok(state.map(|mut s| {
            s.config = s.config.redacted();
            s
        }))
    }

    /// Ordered classification history for a channel.
    pub async fn history(
        &self,
        channel_id: &str,
    ) -> Result<Vec<HistoryEntry>, GuardianError> {
        self.store.history(channel_id).await
    }
}
