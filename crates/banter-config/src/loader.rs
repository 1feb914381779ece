// SPDX-FileCopyrightText: 2026 Banter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports the XDG hierarchy: `./banter.toml` > `~/.config/banter/banter.toml`
//! > `/etc/banter/banter.toml`, with environment overrides via the `BANTER_`
//! prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use tracing::debug;

use crate::model::BanterConfig;

/// Load configuration from the standard XDG hierarchy with env overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/banter/banter.toml` (system-wide)
/// 3. `~/.config/banter/banter.toml` (user XDG config)
/// 4. `./banter.toml` (local directory)
/// 5. `BANTER_*` environment variables
pub fn load_config() -> Result<BanterConfig, figment::Error> {
    let user_config = dirs::config_dir()
        .map(|d| d.join("banter/banter.toml"))
        .unwrap_or_default();
    debug!(user_config = %user_config.display(), "merging XDG configuration hierarchy");
    Figment::new()
        .merge(Serialized::defaults(BanterConfig::default()))
        .merge(Toml::file("/etc/banter/banter.toml"))
        .merge(Toml::file(user_config))
        .merge(Toml::file("banter.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<BanterConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(BanterConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env overrides.
pub fn load_config_from_path(path: &Path) -> Result<BanterConfig, figment::Error> {
    debug!(path = %path.display(), "loading configuration file");
    Figment::new()
        .merge(Serialized::defaults(BanterConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `BANTER_OPENAI_API_KEY` must map to
/// `openai.api_key`, not `openai.api.key`.
fn env_provider() -> Env {
    Env::prefixed("BANTER_").map(|key| {
        let key_str = key.as_str().to_ascii_lowercase();
        let mapped = key_str
            .replacen("agent_", "agent.", 1)
            .replacen("context_", "context.", 1)
            .replacen("moderation_", "moderation.", 1)
            .replacen("openai_", "openai.", 1)
            .replacen("anthropic_", "anthropic.", 1)
            .replacen("google_", "google.", 1)
            .replacen("groq_", "groq.", 1);
        mapped.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_from_str_applies_defaults_under_partial_toml() {
        let config = load_config_from_str(
            r#"
            [context]
            max_tokens = 512
            "#,
        )
        .unwrap();
        assert_eq!(config.context.max_tokens, 512);
        // Untouched sections keep compiled defaults.
        assert_eq!(config.context.ttl_hours, 24);
        assert_eq!(config.agent.name, "banter");
    }

    #[test]
    fn load_from_str_rejects_unknown_sections() {
        let result = load_config_from_str(
            r#"
            [telemetry]
            enabled = true
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn env_vars_override_toml() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "banter.toml",
                r#"
                [openai]
                default_model = "gpt-4o-mini"
                "#,
            )?;
            jail.set_env("BANTER_OPENAI_API_KEY", "sk-from-env");
            jail.set_env("BANTER_CONTEXT_MAX_TOKENS", "1024");

            let config = load_config().expect("config should load");
            assert_eq!(config.openai.api_key.as_deref(), Some("sk-from-env"));
            assert_eq!(config.openai.default_model.as_deref(), Some("gpt-4o-mini"));
            assert_eq!(config.context.max_tokens, 1024);
            Ok(())
        });
    }
}
