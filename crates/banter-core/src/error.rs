// SPDX-FileCopyrightText: 2026 Banter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Banter conversation engine.

use thiserror::Error;

use crate::message::Role;

/// The primary error type used across all Banter crates.
///
/// Construction-time and type errors surface immediately to the caller.
/// Network-layer errors (`ModerationService`, `Provider`, `Timeout`) are
/// never retried inside the engine; the dispatch layer that drives the
/// engine owns retry and user-messaging policy.
#[derive(Debug, Error)]
pub enum BanterError {
    /// A role string outside the closed role vocabulary.
    #[error("invalid role: {0:?}")]
    InvalidRole(String),

    /// A declared-but-unsupported role (tool/function) was used to build a message.
    #[error("unsupported role for message construction: {0}")]
    NotSupported(Role),

    /// A message with the wrong role was passed where a specific role is required.
    #[error("role mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        expected: &'static str,
        actual: Role,
    },

    /// Transport failure while calling the moderation endpoint.
    #[error("moderation service error: {message}")]
    ModerationService {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The moderation endpoint answered 2xx but the body is missing expected fields.
    #[error("malformed moderation response: {0}")]
    ModerationParse(String),

    /// The backend returned no choices/candidates to extract a completion from.
    #[error("backend returned no usable completion")]
    EmptyCompletion,

    /// No provider adapter has ever been set on the completion engine.
    #[error("no provider adapter has been set")]
    NotInitialized,

    /// Configuration errors (invalid TOML, bad field values, missing credentials).
    #[error("configuration error: {0}")]
    Config(String),

    /// LLM provider errors (transport failure, non-2xx status, undecodable body).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A network call exceeded the configured deadline.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_render() {
        let err = BanterError::InvalidRole("narrator".into());
        assert!(err.to_string().contains("narrator"));

        let err = BanterError::NotSupported(Role::Tool);
        assert!(err.to_string().contains("tool"));

        let err = BanterError::TypeMismatch {
            expected: "system",
            actual: Role::User,
        };
        assert!(err.to_string().contains("expected system"));
    }

    #[test]
    fn service_error_carries_source() {
        let err = BanterError::ModerationService {
            message: "connection refused".into(),
            source: Some(Box::new(std::io::Error::other("refused"))),
        };
        assert!(std::error::Error::source(&err).is_some());
    }
}
