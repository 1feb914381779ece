// SPDX-FileCopyrightText: 2026 Banter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams between the conversation model and the outside world.
//!
//! Both traits use `#[async_trait]` for dynamic dispatch compatibility;
//! concrete implementations live in the moderation and provider crates.

pub mod moderation;
pub mod provider;

pub use moderation::ModerationGate;
pub use provider::ProviderAdapter;
