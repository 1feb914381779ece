// SPDX-FileCopyrightText: 2026 Banter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Completion facade over the provider adapters.

mod engine;

pub use engine::{CompletionEngine, TurnOutcome};
