// SPDX-FileCopyrightText: 2026 Banter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The fixed harm-category vocabulary and moderation verdicts.
//!
//! The vocabulary is closed and canonically ordered; `dominant()` reports
//! the **first** flagged category in that order, not the highest-scoring
//! one. That order-first rule is deliberate, so "dominant" must not be
//! read as "max".

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// A harm category in the moderation endpoint's closed vocabulary.
///
/// Declaration order is the canonical order used for tie-breaking.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum HarmCategory {
    Sexual,
    Hate,
    Harassment,
    SelfHarm,
    SexualMinors,
    HateThreatening,
    ViolenceGraphic,
    SelfHarmIntent,
    SelfHarmInstructions,
    HarassmentThreatening,
    Violence,
}

impl HarmCategory {
    /// The key this category uses on the moderation wire, where sub-variants
    /// are separated with `/` and compound names with `-`.
    pub fn wire_key(&self) -> &'static str {
        match self {
            HarmCategory::Sexual => "sexual",
            HarmCategory::Hate => "hate",
            HarmCategory::Harassment => "harassment",
            HarmCategory::SelfHarm => "self-harm",
            HarmCategory::SexualMinors => "sexual/minors",
            HarmCategory::HateThreatening => "hate/threatening",
            HarmCategory::ViolenceGraphic => "violence/graphic",
            HarmCategory::SelfHarmIntent => "self-harm/intent",
            HarmCategory::SelfHarmInstructions => "self-harm/instructions",
            HarmCategory::HarassmentThreatening => "harassment/threatening",
            HarmCategory::Violence => "violence",
        }
    }

    /// Maps a wire key back to the internal category, or `None` for keys
    /// outside the closed vocabulary.
    pub fn from_wire_key(key: &str) -> Option<Self> {
        Self::iter().find(|c| c.wire_key() == key)
    }
}

/// The verdict produced by one moderation call: a flag and a score per
/// category, plus the aggregate flag (the OR over all category flags).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModerationResult {
    flagged: bool,
    flags: HashMap<HarmCategory, bool>,
    scores: HashMap<HarmCategory, f64>,
}

impl ModerationResult {
    /// Builds a verdict from per-category flags and scores.
    ///
    /// The aggregate flag is recomputed as the OR over the category flags
    /// rather than trusted from the wire, which keeps the
    /// `flagged == OR(flags)` invariant structural.
    pub fn new(flags: HashMap<HarmCategory, bool>, scores: HashMap<HarmCategory, f64>) -> Self {
        let flagged = flags.values().any(|f| *f);
        Self {
            flagged,
            flags,
            scores,
        }
    }

    /// An explicit all-clear verdict: every category unflagged at score 0.0.
    ///
    /// Used when failing open on a malformed moderation response.
    pub fn unflagged() -> Self {
        let flags = HarmCategory::iter().map(|c| (c, false)).collect();
        let scores = HarmCategory::iter().map(|c| (c, 0.0)).collect();
        Self {
            flagged: false,
            flags,
            scores,
        }
    }

    /// Whether any category is flagged.
    pub fn flagged(&self) -> bool {
        self.flagged
    }

    /// The flag for one category (false when the category is absent).
    pub fn flag(&self, category: HarmCategory) -> bool {
        self.flags.get(&category).copied().unwrap_or(false)
    }

    /// The score for one category (0.0 when the category is absent).
    pub fn score(&self, category: HarmCategory) -> f64 {
        self.scores.get(&category).copied().unwrap_or(0.0)
    }

    /// The first flagged category in canonical order, with its score.
    ///
    /// Order-first, not score-first: a low-scoring category earlier in the
    /// vocabulary wins over a high-scoring later one.
    pub fn dominant(&self) -> Option<(HarmCategory, f64)> {
        HarmCategory::iter()
            .find(|c| self.flag(*c))
            .map(|c| (c, self.score(c)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vocabulary_has_eleven_categories_in_canonical_order() {
        let all: Vec<HarmCategory> = HarmCategory::iter().collect();
        assert_eq!(all.len(), 11);
        assert_eq!(all[0], HarmCategory::Sexual);
        assert_eq!(all[10], HarmCategory::Violence);
    }

    #[test]
    fn wire_keys_round_trip() {
        for category in HarmCategory::iter() {
            assert_eq!(
                HarmCategory::from_wire_key(category.wire_key()),
                Some(category)
            );
        }
        assert_eq!(HarmCategory::from_wire_key("self-harm/intent"), Some(HarmCategory::SelfHarmIntent));
        assert_eq!(HarmCategory::from_wire_key("jaywalking"), None);
    }

    #[test]
    fn internal_names_are_underscore_joined() {
        assert_eq!(HarmCategory::SelfHarmIntent.to_string(), "self_harm_intent");
        assert_eq!(
            serde_json::to_string(&HarmCategory::SexualMinors).unwrap(),
            "\"sexual_minors\""
        );
    }

    #[test]
    fn aggregate_flag_is_or_over_categories() {
        let mut flags = HashMap::new();
        flags.insert(HarmCategory::Hate, false);
        flags.insert(HarmCategory::Violence, true);
        let result = ModerationResult::new(flags, HashMap::new());
        assert!(result.flagged());

        assert!(!ModerationResult::unflagged().flagged());
    }

    #[test]
    fn dominant_prefers_canonical_order_over_score() {
        // Sexual (0.2) precedes Violence (0.9) in the vocabulary, so it
        // wins despite the lower score.
        let mut flags = HashMap::new();
        flags.insert(HarmCategory::Sexual, true);
        flags.insert(HarmCategory::Violence, true);
        let mut scores = HashMap::new();
        scores.insert(HarmCategory::Sexual, 0.2);
        scores.insert(HarmCategory::Violence, 0.9);

        let result = ModerationResult::new(flags, scores);
        assert_eq!(result.dominant(), Some((HarmCategory::Sexual, 0.2)));
    }

    #[test]
    fn dominant_is_none_when_nothing_flagged() {
        assert_eq!(ModerationResult::unflagged().dominant(), None);
    }

    #[test]
    fn missing_categories_default_clear() {
        let result = ModerationResult::new(HashMap::new(), HashMap::new());
        assert!(!result.flag(HarmCategory::Hate));
        assert_eq!(result.score(HarmCategory::Hate), 0.0);
    }
}
