// SPDX-FileCopyrightText: 2026 Guardian Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Base trait that all service adapters must implement.

use async_trait::async_trait;

use crate::error::GuardianError;
use crate::types::{AdapterKind, HealthStatus};

/// The base trait for all Guardian service adapters.
///
/// Every adapter (fetcher, classifier, notifier, store) implements this
/// trait, which provides identity, lifecycle, and health check capabilities.
#[async_trait]
pub trait ServiceAdapter: Send + Sync + 'static {
    /// Returns the human-readable name of this adapter instance.
    fn name(&self) -> &str;

    /// Returns the semantic version of this adapter.
    fn version(&self) -> semver::Version;

    /// Returns the kind of adapter (fetcher, classifier, notifier, store).
    fn kind(&self) -> AdapterKind;

    /// Performs a health check and returns the adapter's current status.
    async fn health_check(&self) -> Result<HealthStatus, GuardianError>;

    /// Gracefully shuts down the adapter, releasing any held resources.
    async fn shutdown(&self) -> Result<(), GuardianError>;
}
