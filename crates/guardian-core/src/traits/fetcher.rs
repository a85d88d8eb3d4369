// SPDX-FileCopyrightText: 2026 Guardian Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fetcher trait for messaging platform integrations.

use async_trait::async_trait;

use crate::error::GuardianError;
use crate::traits::adapter::ServiceAdapter;
use crate::types::{Cursor, FetchBatch};

/// Adapter for reading new messages from the monitored channel.
///
/// Implementations wrap an external messaging platform and normalize its
/// responses into the core data model before the loop sees them.
#[async_trait]
pub trait MessageFetcher: ServiceAdapter {
    /// Fetches messages strictly newer than `cursor`, in ascending
    /// timestamp order, with no duplicates.
    ///
    /// `None` means no position has been committed yet; implementations
    /// return the most recent messages up to their configured limit. An
    /// empty batch is success, not an error.
    ///
    /// # Errors
    /// [`GuardianError::FetchTransient`] for connectivity failures worth
    /// retrying; [`GuardianError::FetchFatal`] for an invalid or
    /// inaccessible channel.
    async fn fetch_since(
        &self,
        channel_id: &str,
        cursor: Option<&Cursor>,
    ) -> Result<FetchBatch, GuardianError>;
}
