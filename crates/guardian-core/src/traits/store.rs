// SPDX-FileCopyrightText: 2026 Guardian Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! State store trait for durable session persistence.

use async_trait::async_trait;

use crate::error::GuardianError;
use crate::traits::adapter::ServiceAdapter;
use crate::types::{AlertRecord, ChannelMessage, HistoryEntry, SessionState, Verdict};

/// Adapter for the durable session record and the append-only verdict and
/// alert logs.
///
/// A `save_state` either fully persists or leaves the prior durable state
/// intact; no partial write is observable to a subsequent `load_state`.
/// The monitoring loop is the sole writer of session state.
#[async_trait]
pub trait StateStore: ServiceAdapter {
    /// Opens the backend (migrations, connection setup).
    async fn initialize(&self) -> Result<(), GuardianError>;

    /// Flushes pending writes and releases the connection.
    async fn close(&self) -> Result<(), GuardianError>;

    /// Loads the session record for a channel, or `None` if the channel has
    /// never been configured (callers substitute the stopped default).
    async fn load_state(&self, channel_id: &str)
        -> Result<Option<SessionState>, GuardianError>;

    /// Persists the full session record. Atomic: failure leaves the prior
    /// record intact and is reported to the caller.
    async fn save_state(&self, state: &SessionState) -> Result<(), GuardianError>;

    /// Appends a verdict, keeping the message snapshot for the history
    /// surface. A second record for the same message id is a no-op.
    async fn record_verdict(
        &self,
        channel_id: &str,
        message: &ChannelMessage,
        verdict: &Verdict,
    ) -> Result<(), GuardianError>;

    /// Returns the cached verdict for a message id, if one was recorded.
    async fn get_verdict(&self, message_id: &str)
        -> Result<Option<Verdict>, GuardianError>;

    /// Appends an alert record. A second record for the same message id is
    /// a no-op.
    async fn record_alert(
        &self,
        channel_id: &str,
        alert: &AlertRecord,
    ) -> Result<(), GuardianError>;

    /// Returns true if an alert has already been delivered for this
    /// message id.
    async fn has_alert(&self, message_id: &str) -> Result<bool, GuardianError>;

    /// Returns the ordered classification history for a channel, oldest
    /// first, with the matching alert record where one exists.
    async fn history(&self, channel_id: &str)
        -> Result<Vec<HistoryEntry>, GuardianError>;
}
