// SPDX-FileCopyrightText: 2026 Guardian Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Guardian integration tests.
//!
//! Provides mock implementations of the fetcher, classifier, and notifier
//! traits plus a temp-file SQLite store harness.

pub mod harness;
pub mod mock_classifier;
pub mod mock_fetcher;
pub mod mock_notifier;

pub use harness::{TestStore, test_monitor_config};
pub use mock_classifier::MockClassifier;
pub use mock_fetcher::{MockFetcher, make_message};
pub use mock_notifier::{MockNotifier, SentAlert};
