// SPDX-FileCopyrightText: 2026 Guardian Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across adapter traits and the monitoring loop.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::GuardianError;

/// Opaque cursor into the message stream.
///
/// Wraps the platform message timestamp (e.g. `"1712345678.000100"`).
/// Cursors advance monotonically; comparison is numeric, falling back to
/// lexicographic order when a value does not parse.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cursor(pub String);

impl Cursor {
    /// Returns true if `self` points strictly past `other` in the stream.
    pub fn newer_than(&self, other: &Cursor) -> bool {
        match (self.0.parse::<f64>(), other.0.parse::<f64>()) {
            (Ok(a), Ok(b)) => a > b,
            _ => self.0 > other.0,
        }
    }
}

impl std::fmt::Display for Cursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A message fetched from the monitored channel. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelMessage {
    /// Unique message id within the channel (the platform timestamp).
    pub id: String,
    /// Display name or user id of the sender.
    pub sender: String,
    /// Message text.
    pub text: String,
    /// Position of this message in the stream.
    pub ts: Cursor,
}

/// Risk severity assigned to a message by the classifier.
///
/// Variant order is significant: `Suspicious` and `Predatory` compare
/// greater than `Safe`, so the alert threshold is a simple `>=` check.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumString, Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Safe,
    Suspicious,
    Predatory,
}

/// The classification outcome for one message. Produced at most once per
/// message id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub message_id: String,
    pub severity: Severity,
    pub rationale: String,
}

/// Record of a delivered alert. At most one per message id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRecord {
    pub message_id: String,
    pub severity: Severity,
    /// RFC 3339 timestamp of the successful send.
    pub sent_at: String,
}

/// A batch of messages returned by one fetch, with the cursor to commit
/// once the whole batch has been processed.
#[derive(Debug, Clone, Default)]
pub struct FetchBatch {
    /// Messages strictly newer than the requested cursor, ascending by ts.
    pub messages: Vec<ChannelMessage>,
    /// Cursor past the last message in the batch; `None` when empty.
    pub cursor: Option<Cursor>,
}

/// One row of the operator history surface.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub message: ChannelMessage,
    pub verdict: Verdict,
    pub alert: Option<AlertRecord>,
}

/// Lifecycle status of the monitoring session.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MonitorStatus {
    Stopped,
    Starting,
    Running,
    Error,
}

/// Validated runtime configuration for one monitoring session.
///
/// Immutable while the session is active; changing any field requires
/// stop / reconfigure / start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Channel to monitor.
    pub channel_id: String,
    /// Recipient of alert emails.
    pub parent_email: String,
    /// Classification service API key.
    pub api_key: String,
    /// Delay between ticks.
    pub poll_interval: Duration,
    /// Minimum severity that triggers an alert.
    pub alert_threshold: Severity,
    /// Number of messages fetched on the first run, before any cursor exists.
    pub fetch_limit: u32,
}

impl MonitorConfig {
    /// Checks that every required field is present and well-formed.
    ///
    /// Called on the `Starting` transition; any failure moves the session
    /// to `Error` with a configuration-incomplete reason.
    pub fn validate(&self) -> Result<(), GuardianError> {
        if self.channel_id.trim().is_empty() {
            return Err(GuardianError::Config(
                "monitor.channel_id must not be empty".into(),
            ));
        }
        if self.parent_email.trim().is_empty() {
            return Err(GuardianError::Config(
                "monitor.parent_email must not be empty".into(),
            ));
        }
        if !self.parent_email.contains('@') {
            return Err(GuardianError::Config(format!(
                "monitor.parent_email `{}` is not a valid email address",
                self.parent_email
            )));
        }
        if self.api_key.trim().is_empty() {
            return Err(GuardianError::Config(
                "anthropic.api_key must not be empty".into(),
            ));
        }
        if self.poll_interval.is_zero() {
            return Err(GuardianError::Config(
                "monitor.poll_interval_secs must be at least 1".into(),
            ));
        }
        if self.fetch_limit == 0 {
            return Err(GuardianError::Config(
                "monitor.fetch_limit must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Returns a copy with the API key masked, for read-back to the
    /// operator surface.
    pub fn redacted(&self) -> MonitorConfig {
        MonitorConfig {
            api_key: "***".into(),
            ..self.clone()
        }
    }
}

/// Durable state of one monitoring session, keyed by channel id.
///
/// The monitoring loop is the sole writer; all other surfaces receive
/// immutable snapshots through the state store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub config: MonitorConfig,
    /// Last committed position in the message stream. `None` before the
    /// first successful tick.
    pub cursor: Option<Cursor>,
    pub status: MonitorStatus,
    pub last_error: Option<String>,
    /// RFC 3339 timestamp of the last mutation.
    pub updated_at: String,
}

impl SessionState {
    /// The state of a session that has never run: stopped, no cursor.
    pub fn stopped_default(config: MonitorConfig) -> Self {
        Self {
            config,
            cursor: None,
            status: MonitorStatus::Stopped,
            last_error: None,
            updated_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Identifies the type of adapter behind a [`crate::ServiceAdapter`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterKind {
    Fetcher,
    Classifier,
    Notifier,
    Store,
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}
