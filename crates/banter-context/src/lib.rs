// SPDX-FileCopyrightText: 2026 Banter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation state: bounded per-guild histories, a lazy guild registry,
//! and TOML preload files.

mod context;
mod preload;
mod registry;

pub use context::{ChatContext, IntoContextMessage};
pub use preload::Preload;
pub use registry::GuildRegistry;
