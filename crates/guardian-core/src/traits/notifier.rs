// SPDX-FileCopyrightText: 2026 Guardian Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notifier trait for alert delivery channels.

use async_trait::async_trait;

use crate::error::GuardianError;
use crate::traits::adapter::ServiceAdapter;

/// Adapter for delivering a formatted alert to the guardian.
///
/// Stateless per call; idempotence is the dispatcher's responsibility
/// (via the alert log), not the notifier's.
#[async_trait]
pub trait AlertNotifier: ServiceAdapter {
    /// Delivers one alert.
    ///
    /// # Errors
    /// [`GuardianError::DispatchFailed`] on delivery failure -- the caller
    /// must not record the alert as sent.
    async fn send(
        &self,
        to: &str,
        subject: &str,
        html_body: &str,
    ) -> Result<(), GuardianError>;
}
