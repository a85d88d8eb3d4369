// SPDX-FileCopyrightText: 2026 Guardian Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Classifier trait for risk assessment backends.

use async_trait::async_trait;

use crate::error::GuardianError;
use crate::traits::adapter::ServiceAdapter;
use crate::types::{ChannelMessage, Verdict};

/// Adapter for classifying a message's risk severity.
///
/// Implementations validate and normalize the backend's response into
/// exactly one of the three severities; the loop never sees a raw
/// backend payload.
#[async_trait]
pub trait Classifier: ServiceAdapter {
    /// Classifies one message, returning its verdict.
    ///
    /// # Errors
    /// [`GuardianError::ClassifyTransient`] on any backend failure -- the
    /// message must be retried on a later tick, never dropped or alerted
    /// unclassified.
    async fn classify(&self, message: &ChannelMessage) -> Result<Verdict, GuardianError>;
}
