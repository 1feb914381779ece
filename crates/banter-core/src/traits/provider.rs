// SPDX-FileCopyrightText: 2026 Banter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The provider-adapter seam: format translation between the canonical
//! rendered message list and one backend's completion wire schema.

use async_trait::async_trait;

use crate::error::BanterError;
use crate::message::Message;
use crate::types::{ModelDescription, WireMessage};

/// Format-translation boundary for one LLM backend.
///
/// `to_provider_format` and `parse_response` are pure with respect to the
/// adapter; `complete` issues the network call and funnels the body through
/// `parse_response`. Adapters never retry: retry and user-messaging policy
/// belong to the dispatch layer driving the engine.
#[async_trait]
pub trait ProviderAdapter: Send + Sync + 'static {
    /// Static metadata for the active model.
    fn description(&self) -> ModelDescription;

    /// Converts the canonical rendered message list into the
    /// provider-specific request body.
    fn to_provider_format(&self, rendered: &[WireMessage]) -> serde_json::Value;

    /// Extracts the single completion from the backend's response envelope.
    ///
    /// Fails with [`BanterError::EmptyCompletion`] when the backend returns
    /// no choices/candidates; callers substitute a fallback system-authored
    /// message rather than surfacing a raw empty state.
    fn parse_response(&self, raw: serde_json::Value) -> Result<Message, BanterError>;

    /// Formats `rendered`, invokes the backend, and parses the response.
    async fn complete(&self, rendered: &[WireMessage]) -> Result<Message, BanterError>;
}
