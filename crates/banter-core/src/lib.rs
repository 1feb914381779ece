// SPDX-FileCopyrightText: 2026 Banter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Banter conversation engine.
//!
//! This crate provides the conversation data model (roles, messages, lazy
//! moderation state), the fixed harm-category vocabulary, token counting
//! strategies, the shared error type, and the trait seams implemented by
//! the provider-adapter and moderation crates.

pub mod error;
pub mod message;
pub mod moderation;
pub mod tokens;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::BanterError;
pub use message::{Message, ModerationState, Role};
pub use moderation::{HarmCategory, ModerationResult};
pub use tokens::TokenCounter;
pub use traits::{ModerationGate, ProviderAdapter};
pub use types::{GuildId, ModelDescription, WireMessage};
