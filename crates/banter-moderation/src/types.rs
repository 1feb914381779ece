// SPDX-FileCopyrightText: 2026 Banter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Moderation endpoint request/response wire types.

use std::collections::HashMap;

use banter_core::{HarmCategory, ModerationResult};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A classification request: the text plus the moderation model identifier.
#[derive(Debug, Clone, Serialize)]
pub struct ModerationRequest {
    pub input: String,
    pub model: String,
}

/// The moderation endpoint's response envelope.
///
/// Every field is required: a 2xx body that does not carry them is a
/// malformed response, which the gate reports as `ModerationParse`.
#[derive(Debug, Clone, Deserialize)]
pub struct ModerationResponse {
    pub results: Vec<ModerationOutcome>,
}

/// One classification outcome within a response.
#[derive(Debug, Clone, Deserialize)]
pub struct ModerationOutcome {
    pub flagged: bool,
    pub categories: HashMap<String, bool>,
    pub category_scores: HashMap<String, f64>,
}

impl ModerationOutcome {
    /// Maps the wire outcome into the canonical verdict.
    ///
    /// Wire keys use `/` and `-` separators (`self-harm/intent`); keys
    /// outside the closed vocabulary are ignored. The aggregate flag is
    /// recomputed from the category flags rather than trusted from the
    /// wire.
    pub fn into_result(self) -> ModerationResult {
        let mut flags = HashMap::new();
        for (key, value) in self.categories {
            match HarmCategory::from_wire_key(&key) {
                Some(category) => {
                    flags.insert(category, value);
                }
                None => debug!(%key, "ignoring unknown moderation category"),
            }
        }

        let mut scores = HashMap::new();
        for (key, value) in self.category_scores {
            if let Some(category) = HarmCategory::from_wire_key(&key) {
                scores.insert(category, value);
            }
        }

        ModerationResult::new(flags, scores)
    }
}

/// Error envelope returned by the endpoint on non-2xx statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetail {
    #[serde(rename = "type")]
    pub type_: String,
    pub message: String,
}
