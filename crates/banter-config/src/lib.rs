// SPDX-FileCopyrightText: 2026 Banter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Banter conversation engine.
//!
//! Provides TOML configuration parsing with strict validation
//! (`deny_unknown_fields`), XDG file hierarchy lookup, and environment
//! variable overrides via the `BANTER_` prefix.
//!
//! # Usage
//!
//! ```no_run
//! let config = banter_config::load_and_validate().expect("config errors");
//! println!("agent name: {}", config.agent.name);
//! ```

pub mod loader;
pub mod model;
pub mod validation;

use banter_core::BanterError;

pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{
    AgentConfig, AnthropicConfig, BanterConfig, ContextConfig, ModerationConfig, ProviderConfig,
};
pub use validation::validate_config;

/// Load configuration from the XDG hierarchy and validate it.
///
/// Figment errors (bad TOML, unknown keys) and value errors are both
/// reported as [`BanterError::Config`] entries.
pub fn load_and_validate() -> Result<BanterConfig, Vec<BanterError>> {
    match loader::load_config() {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(vec![BanterError::Config(err.to_string())]),
    }
}

/// Load configuration from a TOML string and validate it.
///
/// Useful for testing and explicit configuration.
pub fn load_and_validate_str(toml_content: &str) -> Result<BanterConfig, Vec<BanterError>> {
    match loader::load_config_from_str(toml_content) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(vec![BanterError::Config(err.to_string())]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_and_validate_str_catches_value_errors() {
        let errors = load_and_validate_str(
            r#"
            [context]
            ttl_hours = 0
            "#,
        )
        .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("ttl_hours"));
    }

    #[test]
    fn load_and_validate_str_accepts_good_config() {
        let config = load_and_validate_str(
            r#"
            [agent]
            log_level = "debug"
            "#,
        )
        .unwrap();
        assert_eq!(config.agent.log_level, "debug");
    }
}
