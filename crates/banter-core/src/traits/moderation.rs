// SPDX-FileCopyrightText: 2026 Banter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The content-moderation gate seam.

use async_trait::async_trait;

use crate::error::BanterError;
use crate::moderation::ModerationResult;

/// Wraps a remote content-classification call.
///
/// This layer is stateless: no caching (a message caches its own verdict)
/// and no retries. Transport failures surface as
/// [`BanterError::ModerationService`]; a 2xx response missing expected
/// fields surfaces as [`BanterError::ModerationParse`] so the caller can
/// apply its fail-open/fail-closed policy explicitly.
#[async_trait]
pub trait ModerationGate: Send + Sync + 'static {
    /// Classifies `text` against the fixed harm-category vocabulary.
    async fn classify(&self, text: &str) -> Result<ModerationResult, BanterError>;
}
