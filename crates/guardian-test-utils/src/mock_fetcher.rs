// SPDX-FileCopyrightText: 2026 Guardian Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock message fetcher for deterministic testing.
//!
//! `MockFetcher` implements `MessageFetcher` with a scripted queue of fetch
//! outcomes. Each call to `fetch_since` pops the next outcome; an exhausted
//! queue yields empty batches, mimicking a quiet channel.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use guardian_core::{
    AdapterKind, ChannelMessage, Cursor, FetchBatch, GuardianError, HealthStatus,
    MessageFetcher, ServiceAdapter,
};

/// A scripted message fetcher for testing.
pub struct MockFetcher {
    outcomes: Arc<Mutex<VecDeque<Result<FetchBatch, GuardianError>>>>,
    calls: Arc<Mutex<Vec<Option<Cursor>>>>,
}

impl MockFetcher {
    /// Create a new mock fetcher with an empty script.
    pub fn new() -> Self {
        Self {
            outcomes: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queue a successful batch for the next fetch call.
    ///
    /// The batch cursor is derived from the last message, as a real
    /// fetcher would.
    pub async fn push_messages(&self, messages: Vec<ChannelMessage>) {
        let cursor = messages.last().map(|m| m.ts.clone());
        self.outcomes
            .lock()
            .await
            .push_back(Ok(FetchBatch { messages, cursor }));
    }

    /// Queue an error for the next fetch call.
    pub async fn push_error(&self, error: GuardianError) {
        self.outcomes.lock().await.push_back(Err(error));
    }

    /// Cursors observed by each fetch call, in order.
    pub async fn observed_cursors(&self) -> Vec<Option<Cursor>> {
        self.calls.lock().await.clone()
    }

    /// Number of fetch calls made so far.
    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }
}

impl Default for MockFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ServiceAdapter for MockFetcher {
    fn name(&self) -> &str {
        "mock-fetcher"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn kind(&self) -> AdapterKind {
        AdapterKind::Fetcher
    }

    async fn health_check(&self) -> Result<HealthStatus, GuardianError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), GuardianError> {
        Ok(())
    }
}

#[async_trait]
impl MessageFetcher for MockFetcher {
    async fn fetch_since(
        &self,
        _channel_id: &str,
        cursor: Option<&Cursor>,
    ) -> Result<FetchBatch, GuardianError> {
        self.calls.lock().await.push(cursor.cloned());
        match self.outcomes.lock().await.pop_front() {
            Some(outcome) => outcome,
            None => Ok(FetchBatch::default()),
        }
    }
}

/// Build a test message whose id and ts share the given timestamp string.
pub fn make_message(ts: &str, sender: &str, text: &str) -> ChannelMessage {
    ChannelMessage {
        id: ts.to_string(),
        sender: sender.to_string(),
        text: text.to_string(),
        ts: Cursor(ts.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scripted_batches_come_back_in_order() {
        let fetcher = MockFetcher::new();
        fetcher
            .push_messages(vec![make_message("1.0", "U1", "first")])
            .await;
        fetcher
            .push_messages(vec![make_message("2.0", "U1", "second")])
            .await;

        let b1 = fetcher.fetch_since("C1", None).await.unwrap();
        let b2 = fetcher.fetch_since("C1", None).await.unwrap();
        assert_eq!(b1.messages[0].text, "first");
        assert_eq!(b2.messages[0].text, "second");
        assert_eq!(b2.cursor, Some(Cursor("2.0".into())));
    }

    #[tokio::test]
    async fn exhausted_script_yields_empty_batches() {
        let fetcher = MockFetcher::new();
        let batch = fetcher.fetch_since("C1", None).await.unwrap();
        assert!(batch.messages.is_empty());
        assert!(batch.cursor.is_none());
    }

    #[tokio::test]
    async fn errors_pop_in_sequence_and_cursors_are_recorded() {
        let fetcher = MockFetcher::new();
        fetcher
            .push_error(GuardianError::FetchTransient {
                message: "down".into(),
                source: None,
            })
            .await;
        fetcher.push_messages(vec![]).await;

        assert!(fetcher.fetch_since("C1", None).await.is_err());
        let cursor = Cursor("5.0".into());
        assert!(fetcher.fetch_since("C1", Some(&cursor)).await.is_ok());

        let observed = fetcher.observed_cursors().await;
        assert_eq!(observed, vec![None, Some(Cursor("5.0".into()))]);
        assert_eq!(fetcher.call_count().await, 2);
    }
}
