// SPDX-FileCopyrightText: 2026 Banter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup instead of silently ignoring typos.

use banter_core::TokenCounter;
use serde::{Deserialize, Serialize};

/// Top-level Banter configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible
/// values; credentials default to `None` and may be supplied through the
/// environment.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BanterConfig {
    /// Agent identity and default system prompt.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Context budget and staleness settings.
    #[serde(default)]
    pub context: ContextConfig,

    /// Moderation endpoint settings.
    #[serde(default)]
    pub moderation: ModerationConfig,

    /// OpenAI chat-completions backend.
    #[serde(default)]
    pub openai: ProviderConfig,

    /// Anthropic messages backend.
    #[serde(default)]
    pub anthropic: AnthropicConfig,

    /// Google Gemini backend.
    #[serde(default)]
    pub google: ProviderConfig,

    /// Groq (OpenAI-compatible) backend.
    #[serde(default)]
    pub groq: ProviderConfig,
}

/// Agent identity and behavior configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the agent.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error). Subscriber setup is
    /// the host process's job; the engine only carries the setting.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Default system prompt for freshly created contexts.
    #[serde(default)]
    pub system_prompt: Option<String>,

    /// Path to a TOML preload file applied to freshly created contexts.
    #[serde(default)]
    pub preload_file: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
            system_prompt: None,
            preload_file: None,
        }
    }
}

fn default_agent_name() -> String {
    "banter".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Context budget and staleness configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ContextConfig {
    /// Token budget for one conversation context.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,

    /// Time-to-live for live history messages, in hours.
    #[serde(default = "default_ttl_hours")]
    pub ttl_hours: u32,

    /// Token counting strategy.
    #[serde(default)]
    pub counter: TokenCounter,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            max_tokens: default_max_tokens(),
            ttl_hours: default_ttl_hours(),
            counter: TokenCounter::default(),
        }
    }
}

fn default_max_tokens() -> usize {
    4096
}

fn default_ttl_hours() -> u32 {
    24
}

/// Moderation endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ModerationConfig {
    /// API key for the moderation endpoint. `None` requires the environment.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Moderation model identifier sent with every classification request.
    #[serde(default = "default_moderation_model")]
    pub model: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_moderation_model(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_moderation_model() -> String {
    "omni-moderation-latest".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

/// Settings shared by the flat-role and Gemini backends.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    /// Backend API key. `None` disables the backend unless the environment
    /// supplies one.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model identifier to request. `None` uses the adapter's default.
    #[serde(default)]
    pub default_model: Option<String>,

    /// Maximum tokens to generate per response. `None` uses the model's
    /// published output ceiling.
    #[serde(default)]
    pub max_output_tokens: Option<u32>,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_model: None,
            max_output_tokens: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Anthropic-specific settings: everything in [`ProviderConfig`] plus the
/// dated API version header.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AnthropicConfig {
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default)]
    pub default_model: Option<String>,

    #[serde(default)]
    pub max_output_tokens: Option<u32>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Anthropic API version string.
    #[serde(default = "default_api_version")]
    pub api_version: String,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_model: None,
            max_output_tokens: None,
            timeout_secs: default_timeout_secs(),
            api_version: default_api_version(),
        }
    }
}

fn default_api_version() -> String {
    "2023-06-01".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = BanterConfig::default();
        assert_eq!(config.agent.name, "banter");
        assert_eq!(config.agent.log_level, "info");
        assert_eq!(config.context.max_tokens, 4096);
        assert_eq!(config.context.ttl_hours, 24);
        assert_eq!(config.context.counter, TokenCounter::Subword);
        assert_eq!(config.moderation.model, "omni-moderation-latest");
        assert_eq!(config.anthropic.api_version, "2023-06-01");
        assert!(config.openai.api_key.is_none());
    }

    #[test]
    fn sections_deserialize_from_toml() {
        let config: BanterConfig = toml::from_str(
            r#"
            [agent]
            name = "turbo"
            system_prompt = "You are helpful."

            [context]
            max_tokens = 2048
            ttl_hours = 6
            counter = "words"

            [groq]
            api_key = "gsk-test"
            default_model = "llama-3.1-8b-instant"
            "#,
        )
        .unwrap();
        assert_eq!(config.agent.name, "turbo");
        assert_eq!(config.context.max_tokens, 2048);
        assert_eq!(config.context.counter, TokenCounter::Words);
        assert_eq!(config.groq.api_key.as_deref(), Some("gsk-test"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result: Result<BanterConfig, _> = toml::from_str(
            r#"
            [agent]
            nam = "typo"
            "#,
        );
        assert!(result.is_err());
    }
}
