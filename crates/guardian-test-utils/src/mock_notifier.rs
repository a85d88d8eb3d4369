// SPDX-FileCopyrightText: 2026 Guardian Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock alert notifier for deterministic testing.
//!
//! `MockNotifier` implements `AlertNotifier`, capturing every delivered
//! alert for assertions and supporting injected send failures.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use guardian_core::{
    AdapterKind, AlertNotifier, GuardianError, HealthStatus, ServiceAdapter,
};

/// One captured alert delivery.
#[derive(Debug, Clone, PartialEq)]
pub struct SentAlert {
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

/// A capturing alert notifier for testing.
pub struct MockNotifier {
    sent: Arc<Mutex<Vec<SentAlert>>>,
    fail_next: Arc<Mutex<u32>>,
}

impl MockNotifier {
    /// Create a new mock notifier with an empty capture buffer.
    pub fn new() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            fail_next: Arc::new(Mutex::new(0)),
        }
    }

    /// Make the next `n` send calls fail with a dispatch error.
    pub async fn fail_next(&self, n: u32) {
        *self.fail_next.lock().await = n;
    }

    /// All alerts delivered through `send()`, in order.
    pub async fn sent_alerts(&self) -> Vec<SentAlert> {
        self.sent.lock().await.clone()
    }

    /// Count of delivered alerts.
    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }
}

impl Default for MockNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ServiceAdapter for MockNotifier {
    fn name(&self) -> &str {
        "mock-notifier"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn kind(&self) -> AdapterKind {
        AdapterKind::Notifier
    }

    async fn health_check(&self) -> Result<HealthStatus, GuardianError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), GuardianError> {
        Ok(())
    }
}

#[async_trait]
impl AlertNotifier for MockNotifier {
    async fn send(
        &self,
        to: &str,
        subject: &str,
        html_body: &str,
    ) -> Result<(), GuardianError> {
        {
            let mut remaining = self.fail_next.lock().await;
            if *remaining > 0 {
                *remaining -= 1;
                return Err(GuardianError::DispatchFailed {
                    message: "mock SMTP refused".into(),
                    source: None,
                });
            }
        }

        self.sent.lock().await.push(SentAlert {
            to: to.to_string(),
            subject: subject.to_string(),
            html_body: html_body.to_string(),
        });
        Ok(())
    }
}
