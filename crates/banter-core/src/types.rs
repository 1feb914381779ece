// SPDX-FileCopyrightText: 2026 Banter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared across the Banter workspace.

use serde::{Deserialize, Serialize};

use crate::message::Role;

/// Unique identifier for a conversation ("guild").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GuildId(pub String);

impl std::fmt::Display for GuildId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for GuildId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// The canonical two-field projection of a message, and the unit every
/// provider adapter normalizes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireMessage {
    pub role: Role,
    pub content: String,
}

impl WireMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Static descriptive metadata for a backend model.
///
/// Purely informational: callers use it to pick a model before building an
/// oversized context; the engine itself never branches on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDescription {
    pub model_name: String,
    pub max_input_tokens: u32,
    pub max_output_tokens: u32,
}

impl ModelDescription {
    pub fn new(model_name: impl Into<String>, max_input_tokens: u32, max_output_tokens: u32) -> Self {
        Self {
            model_name: model_name.into(),
            max_input_tokens,
            max_output_tokens,
        }
    }
}

impl std::fmt::Display for ModelDescription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (input: {}, output: {})",
            self.model_name, self.max_input_tokens, self.max_output_tokens
        )
    }
}
