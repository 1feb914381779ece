// SPDX-FileCopyrightText: 2026 Banter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The bounded, ordered conversation history for one guild.
//!
//! A [`ChatContext`] owns a system prompt, preload (few-shot) messages, and
//! the live evictable history. Every mutation re-establishes the budget
//! invariant (`token_total() <= max_tokens`, or the live history is empty)
//! and sweeps messages older than the TTL. The system prompt and preload
//! are exempt from both passes: the budget can never be satisfied by
//! evicting them.

use banter_core::{BanterError, Message, Role, TokenCounter, WireMessage};
use banter_config::ContextConfig;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Accepts either a ready [`Message`] or bare text (treated as a user
/// message, counted with the context's counter).
pub trait IntoContextMessage {
    fn into_message(self, counter: &TokenCounter) -> Message;
}

impl IntoContextMessage for Message {
    fn into_message(self, _counter: &TokenCounter) -> Message {
        self
    }
}

impl IntoContextMessage for String {
    fn into_message(self, counter: &TokenCounter) -> Message {
        Message::user_with(self, counter)
    }
}

impl IntoContextMessage for &str {
    fn into_message(self, counter: &TokenCounter) -> Message {
        Message::user_with(self, counter)
    }
}

/// The per-guild conversation context.
///
/// Serde round-trips the full persistent state (system prompt, preload,
/// live messages, budget, TTL, counter) for callers that want optional
/// durability; the engine itself never persists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatContext {
    system_prompt: Message,
    preload: Vec<Message>,
    messages: Vec<Message>,
    max_tokens: usize,
    ttl_hours: u32,
    counter: TokenCounter,
}

impl Default for ChatContext {
    fn default() -> Self {
        Self::from_config(&ContextConfig::default())
    }
}

impl ChatContext {
    /// Creates an empty context with an empty system prompt.
    pub fn new(max_tokens: usize, ttl_hours: u32, counter: TokenCounter) -> Self {
        Self {
            system_prompt: Message::system_with("", &counter),
            preload: Vec::new(),
            messages: Vec::new(),
            max_tokens,
            ttl_hours,
            counter,
        }
    }

    /// Creates an empty context from the config section.
    pub fn from_config(config: &ContextConfig) -> Self {
        Self::new(config.max_tokens, config.ttl_hours, config.counter)
    }

    pub fn system_prompt(&self) -> &Message {
        &self.system_prompt
    }

    pub fn preload(&self) -> &[Message] {
        &self.preload
    }

    /// The live, evictable history.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn max_tokens(&self) -> usize {
        self.max_tokens
    }

    pub fn counter(&self) -> &TokenCounter {
        &self.counter
    }

    /// The most recent live message, if any.
    pub fn latest(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Total token count: system prompt + preload + live history.
    ///
    /// Recomputed on demand; no incremental counter to drift.
    pub fn token_total(&self) -> usize {
        self.system_prompt.token_count()
            + self.preload.iter().map(Message::token_count).sum::<usize>()
            + self.messages.iter().map(Message::token_count).sum::<usize>()
    }

    /// Appends to the live history, then re-establishes the budget and
    /// staleness invariants.
    pub fn add_message(&mut self, message: impl IntoContextMessage) {
        let message = message.into_message(&self.counter);
        self.messages.push(message);
        self.evict();
        self.sweep_stale();
    }

    /// Appends a preload (few-shot) message. Preload entries hold
    /// conversation turns, so a system-role message is rejected with
    /// [`BanterError::TypeMismatch`]; the system prompt has its own slot.
    pub fn add_preload_message(&mut self, message: Message) -> Result<(), BanterError> {
        if message.role() == Role::System {
            return Err(BanterError::TypeMismatch {
                expected: "user or assistant",
                actual: Role::System,
            });
        }
        self.preload.push(message);
        self.evict();
        self.sweep_stale();
        Ok(())
    }

    /// Replaces the system prompt. Only system-role messages are accepted.
    pub fn set_system_prompt(&mut self, message: Message) -> Result<(), BanterError> {
        if message.role() != Role::System {
            return Err(BanterError::TypeMismatch {
                expected: "system",
                actual: message.role(),
            });
        }
        self.system_prompt = message;
        self.evict();
        self.sweep_stale();
        Ok(())
    }

    /// Renders the canonical wire-form list: system prompt, then preload,
    /// then live history, in order.
    pub fn render(&self) -> Vec<WireMessage> {
        let mut rendered = Vec::with_capacity(1 + self.preload.len() + self.messages.len());
        rendered.push(self.system_prompt.wire());
        rendered.extend(self.preload.iter().map(Message::wire));
        rendered.extend(self.messages.iter().map(Message::wire));
        rendered
    }

    /// Drops the oldest live messages until the budget holds.
    ///
    /// Single-message granularity, oldest first. A single message larger
    /// than the whole budget empties the live history rather than looping;
    /// the system prompt and preload are never candidates.
    fn evict(&mut self) {
        let mut dropped = 0usize;
        while self.token_total() > self.max_tokens && !self.messages.is_empty() {
            self.messages.remove(0);
            dropped += 1;
        }
        if dropped > 0 {
            debug!(
                dropped,
                token_total = self.token_total(),
                max_tokens = self.max_tokens,
                "evicted oldest messages to satisfy token budget"
            );
        }
    }

    /// Drops live messages older than the TTL. Purely time-driven and
    /// independent of the budget.
    fn sweep_stale(&mut self) {
        self.sweep_stale_at(Utc::now());
    }

    fn sweep_stale_at(&mut self, now: DateTime<Utc>) {
        let cutoff = now - Duration::hours(i64::from(self.ttl_hours));
        let before = self.messages.len();
        self.messages.retain(|m| m.created_at() >= cutoff);
        let swept = before - self.messages.len();
        if swept > 0 {
            debug!(swept, ttl_hours = self.ttl_hours, "swept stale messages");
        }
    }
}
