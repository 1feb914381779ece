// SPDX-FileCopyrightText: 2026 Banter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Token counting strategies for budget enforcement.
//!
//! The engine bounds context size in tokens but does not promise exact
//! fidelity to any one backend's tokenizer. The default subword strategy
//! uses the cl100k_base vocabulary via `tiktoken-rs`; the word and byte
//! strategies are cheap approximations useful for tests and callers that
//! do not want the tokenizer dependency on their hot path.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use tiktoken_rs::CoreBPE;

static CL100K: OnceLock<CoreBPE> = OnceLock::new();

/// Returns the shared cl100k_base encoder, building it on first use.
fn cl100k() -> &'static CoreBPE {
    // The vocabulary is embedded in the tiktoken-rs crate; construction
    // only fails if that embedded data is corrupt.
    CL100K.get_or_init(|| {
        tiktoken_rs::cl100k_base().expect("embedded cl100k_base vocabulary")
    })
}

/// Strategy for computing a message's token count at construction time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenCounter {
    /// cl100k_base subword encoding (default).
    #[default]
    Subword,
    /// Whitespace-separated word count.
    Words,
    /// Raw UTF-8 byte length.
    Bytes,
}

impl TokenCounter {
    /// Counts tokens in `text` under this strategy.
    pub fn count(&self, text: &str) -> usize {
        match self {
            TokenCounter::Subword => cl100k().encode_with_special_tokens(text).len(),
            TokenCounter::Words => text.split_whitespace().count(),
            TokenCounter::Bytes => text.len(),
        }
    }
}
