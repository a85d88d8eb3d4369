// SPDX-FileCopyrightText: 2026 Guardian Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types for the Slack Web API subset Guardian consumes.
//!
//! Only the fields the fetcher actually reads are modeled; everything else
//! in the Slack payload is ignored at deserialization.

use serde::Deserialize;

/// Response envelope for `conversations.history`.
#[derive(Debug, Deserialize)]
pub struct HistoryResponse {
    pub ok: bool,
    /// Slack error code when `ok` is false (e.g. `channel_not_found`).
    #[serde(default)]
    pub error: Option<String>,
    /// Messages, newest first.
    #[serde(default)]
    pub messages: Vec<HistoryMessage>,
}

/// One raw message from `conversations.history`.
#[derive(Debug, Deserialize)]
pub struct HistoryMessage {
    /// Event type; plain user messages are `"message"`.
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Present on join/leave/edit and other non-plain messages.
    #[serde(default)]
    pub subtype: Option<String>,
    /// Sending user id; absent for some system messages.
    #[serde(default)]
    pub user: Option<String>,
    /// Present when the message was posted by a bot.
    #[serde(default)]
    pub bot_id: Option<String>,
    #[serde(default)]
    pub text: String,
    pub ts: String,
}

impl HistoryMessage {
    /// Whether this is a plain user message worth classifying.
    ///
    /// Joins, edits, bot posts, and empty texts are dropped at the adapter
    /// boundary so the core only ever sees real conversation content.
    pub fn is_user_message(&self) -> bool {
        self.kind == "message"
            && self.subtype.is_none()
            && self.bot_id.is_none()
            && self.user.is_some()
            && !self.text.trim().is_empty()
    }
}

/// Response envelope for `auth.test`, used by health checks.
#[derive(Debug, Deserialize)]
pub struct AuthTestResponse {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
}
