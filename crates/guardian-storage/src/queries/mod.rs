// SPDX-FileCopyrightText: 2026 Guardian Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query modules. All functions accept `&Database` and go through the
//! single background writer thread.

pub mod alerts;
pub mod state;
pub mod verdicts;
