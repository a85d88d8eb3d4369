// SPDX-FileCopyrightText: 2026 Guardian Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain model types for storage entities.
//!
//! The canonical types are defined in `guardian-core::types` for use across
//! adapter trait boundaries. This module re-exports them for convenience
//! within the storage crate.

pub use guardian_core::types::{
    AlertRecord, ChannelMessage, Cursor, HistoryEntry, MonitorStatus, SessionState, Verdict,
};
