// SPDX-FileCopyrightText: 2026 Banter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! TOML preload files: an optional system prompt plus few-shot turns that
//! seed every freshly created context.
//!
//! ```toml
//! system_prompt = "You are a concise assistant."
//!
//! [[turns]]
//! user = "What color is the sky?"
//! assistant = "Blue."
//! ```

use std::path::Path;

use banter_core::{BanterError, Message, TokenCounter};
use serde::Deserialize;
use tracing::debug;

use crate::context::ChatContext;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PreloadFile {
    #[serde(default)]
    system_prompt: Option<String>,
    #[serde(default)]
    turns: Vec<PreloadTurn>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PreloadTurn {
    user: String,
    assistant: String,
}

/// A parsed preload, ready to stamp onto new contexts.
#[derive(Debug, Clone)]
pub struct Preload {
    system_prompt: Option<Message>,
    messages: Vec<Message>,
}

impl Preload {
    /// Parses preload TOML, counting each message with `counter`.
    pub fn parse(toml_str: &str, counter: &TokenCounter) -> Result<Self, BanterError> {
        let file: PreloadFile = toml::from_str(toml_str)
            .map_err(|e| BanterError::Config(format!("invalid preload file: {e}")))?;

        let system_prompt = file
            .system_prompt
            .map(|p| Message::system_with(p, counter));
        let mut messages = Vec::with_capacity(file.turns.len() * 2);
        for turn in file.turns {
            messages.push(Message::user_with(turn.user, counter));
            messages.push(Message::assistant_with(turn.assistant, counter));
        }
        debug!(turns = messages.len() / 2, "parsed preload");
        Ok(Self {
            system_prompt,
            messages,
        })
    }

    /// Reads and parses a preload file from disk.
    pub fn load(path: impl AsRef<Path>, counter: &TokenCounter) -> Result<Self, BanterError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            BanterError::Config(format!("cannot read preload file {}: {e}", path.display()))
        })?;
        Self::parse(&raw, counter)
    }

    pub fn system_prompt(&self) -> Option<&Message> {
        self.system_prompt.as_ref()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Stamps this preload onto a context: the system prompt (when present)
    /// replaces the context's, and the turns are appended as preload
    /// messages.
    pub fn apply_to(&self, ctx: &mut ChatContext) {
        if let Some(prompt) = &self.system_prompt {
            // System-role by construction in parse().
            let _ = ctx.set_system_prompt(prompt.clone());
        }
        for message in &self.messages {
            let _ = ctx.add_preload_message(message.clone());
        }
    }
}
