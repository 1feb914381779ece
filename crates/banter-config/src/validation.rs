// SPDX-FileCopyrightText: 2026 Banter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation.
//!
//! Figment guarantees shape; this pass checks values that TOML cannot
//! express as types (positive budgets, known log levels).

use banter_core::BanterError;

use crate::model::BanterConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validates a deserialized config, collecting every problem instead of
/// stopping at the first.
pub fn validate_config(config: &BanterConfig) -> Result<(), Vec<BanterError>> {
    let mut errors = Vec::new();

    if config.context.max_tokens == 0 {
        errors.push(BanterError::Config(
            "context.max_tokens must be greater than zero".into(),
        ));
    }
    if config.context.ttl_hours == 0 {
        errors.push(BanterError::Config(
            "context.ttl_hours must be greater than zero".into(),
        ));
    }
    if !LOG_LEVELS.contains(&config.agent.log_level.as_str()) {
        errors.push(BanterError::Config(format!(
            "agent.log_level must be one of {LOG_LEVELS:?}, got {:?}",
            config.agent.log_level
        )));
    }

    for (section, timeout) in [
        ("moderation", config.moderation.timeout_secs),
        ("openai", config.openai.timeout_secs),
        ("anthropic", config.anthropic.timeout_secs),
        ("google", config.google.timeout_secs),
        ("groq", config.groq.timeout_secs),
    ] {
        if timeout == 0 {
            errors.push(BanterError::Config(format!(
                "{section}.timeout_secs must be greater than zero"
            )));
        }
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
