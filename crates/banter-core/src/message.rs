// SPDX-FileCopyrightText: 2026 Banter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Role-tagged conversation messages with lazily-attached moderation state.
//!
//! A [`Message`] is immutable with respect to role, content, and name once
//! constructed. Moderation is a one-shot transition on a tagged variant:
//! either the message is `Unmoderated` or it carries exactly one
//! [`ModerationResult`], and the transition happens at most once, lazily,
//! the first time a moderation-dependent accessor is used.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::warn;

use crate::error::BanterError;
use crate::moderation::{HarmCategory, ModerationResult};
use crate::tokens::TokenCounter;
use crate::traits::ModerationGate;
use crate::types::WireMessage;

/// The closed set of conversation roles.
///
/// `Tool` and `Function` are declared for wire compatibility but message
/// construction with either fails with [`BanterError::NotSupported`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
    Function,
}

impl Role {
    /// Parses a wire role string, rejecting anything outside the closed set.
    pub fn parse(value: &str) -> Result<Self, BanterError> {
        value
            .parse()
            .map_err(|_| BanterError::InvalidRole(value.to_string()))
    }

    /// Whether messages with this role can be constructed.
    pub fn is_supported(&self) -> bool {
        !matches!(self, Role::Tool | Role::Function)
    }
}

/// Moderation lifecycle of a message: untouched, or classified exactly once.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "result")]
pub enum ModerationState {
    #[default]
    Unmoderated,
    Moderated(ModerationResult),
}

/// An immutable-content, role-tagged unit of conversation text.
///
/// The token count is computed once at construction by the supplied
/// [`TokenCounter`] and never re-derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    role: Role,
    content: String,
    name: Option<String>,
    created_at: DateTime<Utc>,
    token_count: usize,
    #[serde(default)]
    moderation: ModerationState,
}

impl Message {
    /// Creates a message, counting tokens with `counter`.
    ///
    /// Fails with [`BanterError::NotSupported`] for tool/function roles.
    pub fn new(
        role: Role,
        content: impl Into<String>,
        name: Option<String>,
        counter: &TokenCounter,
    ) -> Result<Self, BanterError> {
        if !role.is_supported() {
            return Err(BanterError::NotSupported(role));
        }
        let content = content.into();
        let token_count = counter.count(&content);
        Ok(Self {
            role,
            content,
            name,
            created_at: Utc::now(),
            token_count,
            moderation: ModerationState::Unmoderated,
        })
    }

    /// A system message counted with the default subword strategy.
    pub fn system(content: impl Into<String>) -> Self {
        Self::system_with(content, &TokenCounter::default())
    }

    /// A user message counted with the default subword strategy.
    pub fn user(content: impl Into<String>) -> Self {
        Self::user_with(content, &TokenCounter::default())
    }

    /// An assistant message counted with the default subword strategy.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::assistant_with(content, &TokenCounter::default())
    }

    /// A system message counted with an explicit strategy.
    pub fn system_with(content: impl Into<String>, counter: &TokenCounter) -> Self {
        Self::infallible(Role::System, content, counter)
    }

    /// A user message counted with an explicit strategy.
    pub fn user_with(content: impl Into<String>, counter: &TokenCounter) -> Self {
        Self::infallible(Role::User, content, counter)
    }

    /// An assistant message counted with an explicit strategy.
    pub fn assistant_with(content: impl Into<String>, counter: &TokenCounter) -> Self {
        Self::infallible(Role::Assistant, content, counter)
    }

    fn infallible(role: Role, content: impl Into<String>, counter: &TokenCounter) -> Self {
        // Only called with the three supported roles above.
        match Self::new(role, content, None, counter) {
            Ok(message) => message,
            Err(_) => unreachable!("system/user/assistant are always supported"),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Optional participant name, disambiguating same-role participants.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn token_count(&self) -> usize {
        self.token_count
    }

    /// The canonical two-field `{role, content}` projection used by adapters.
    pub fn wire(&self) -> WireMessage {
        WireMessage {
            role: self.role,
            content: self.content.clone(),
        }
    }

    /// Whether a moderation verdict has been attached.
    pub fn is_moderated(&self) -> bool {
        matches!(self.moderation, ModerationState::Moderated(_))
    }

    /// The attached verdict, if moderation has run.
    pub fn moderation(&self) -> Option<&ModerationResult> {
        match &self.moderation {
            ModerationState::Moderated(result) => Some(result),
            ModerationState::Unmoderated => None,
        }
    }

    /// Attaches a verdict if none is present. The first verdict wins;
    /// re-moderation never happens.
    pub fn apply_moderation(&mut self, result: ModerationResult) {
        if let ModerationState::Unmoderated = self.moderation {
            self.moderation = ModerationState::Moderated(result);
        }
    }

    /// Classifies the message through `gate` if it has not been classified
    /// yet, then returns the attached verdict. Idempotent: subsequent calls
    /// never reach the gate again.
    ///
    /// Malformed gate responses fail open: the message records an explicit
    /// all-clear verdict (policy discussed in DESIGN.md). Transport
    /// failures propagate and leave the message unmoderated so a later
    /// attempt can classify it.
    pub async fn ensure_moderated(
        &mut self,
        gate: &dyn ModerationGate,
    ) -> Result<&ModerationResult, BanterError> {
        if let ModerationState::Unmoderated = self.moderation {
            let result = match gate.classify(&self.content).await {
                Ok(result) => result,
                Err(BanterError::ModerationParse(reason)) => {
                    warn!(%reason, "malformed moderation response, failing open");
                    ModerationResult::unflagged()
                }
                Err(err) => return Err(err),
            };
            self.moderation = ModerationState::Moderated(result);
        }
        let ModerationState::Moderated(result) = &self.moderation else {
            // The branch above always stores a verdict.
            return Err(BanterError::ModerationParse(
                "moderation verdict missing after classification".into(),
            ));
        };
        Ok(result)
    }

    /// Whether the message is flagged, classifying it on first access.
    pub async fn flagged(&mut self, gate: &dyn ModerationGate) -> Result<bool, BanterError> {
        Ok(self.ensure_moderated(gate).await?.flagged())
    }

    /// The first flagged category in canonical order with its score,
    /// classifying the message on first access. `None` when clean.
    pub async fn dominant_category(
        &mut self,
        gate: &dyn ModerationGate,
    ) -> Result<Option<(HarmCategory, f64)>, BanterError> {
        Ok(self.ensure_moderated(gate).await?.dominant())
    }
}
