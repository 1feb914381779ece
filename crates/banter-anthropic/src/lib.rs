// SPDX-FileCopyrightText: 2026 Banter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Anthropic Messages API adapter.
//!
//! A no-leading-system backend: the API rejects system-role turns and a
//! sequence that opens with anything it treats as an assistant turn.
//! Normalization policy: system-role entries are dropped from the turn
//! list and carried in the request's dedicated `system` field (joined in
//! order); when the remaining turns do not begin with a user entry, a
//! synthetic user turn is prepended.

pub mod client;
pub mod types;

use async_trait::async_trait;
use banter_config::AnthropicConfig;
use banter_core::{
    BanterError, Message, ModelDescription, ProviderAdapter, Role, TokenCounter, WireMessage,
};
use tracing::debug;

use crate::client::AnthropicClient;
use crate::types::{ApiMessage, ContentBlock, MessageRequest, MessageResponse};

/// Environment variable consulted when the config carries no key.
const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

/// Content of the synthetic opening turn inserted when the sequence would
/// otherwise not start with a user entry.
const SYNTHETIC_OPENING_TURN: &str = "(ignore this message)";

/// Known models with their published token ceilings.
pub const AVAILABLE_MODELS: &[(&str, u32, u32)] = &[
    ("claude-3-opus-20240229", 200_000, 4_096),
    ("claude-3-sonnet-20240229", 200_000, 4_096),
    ("claude-3-haiku-20240307", 200_000, 4_096),
];

const DEFAULT_MODEL: &str = "claude-3-opus-20240229";

/// [`ProviderAdapter`] for the Anthropic Messages API.
pub struct AnthropicAdapter {
    client: AnthropicClient,
    description: ModelDescription,
    max_output_tokens: u32,
    counter: TokenCounter,
}

impl AnthropicAdapter {
    /// Creates an adapter from the `anthropic` config section. The API key
    /// resolves config first, then `ANTHROPIC_API_KEY`.
    pub fn new(config: &AnthropicConfig, counter: TokenCounter) -> Result<Self, BanterError> {
        let api_key = resolve_api_key(&config.api_key)?;
        let model = config.default_model.as_deref().unwrap_or(DEFAULT_MODEL);
        let description = describe_model(model);

        Ok(Self {
            client: AnthropicClient::new(&api_key, &config.api_version, config.timeout_secs)?,
            max_output_tokens: config
                .max_output_tokens
                .unwrap_or(description.max_output_tokens),
            description,
            counter,
        })
    }

    #[cfg(test)]
    fn with_base_url(mut self, url: String) -> Self {
        self.client = self.client.with_base_url(url);
        self
    }
}

#[async_trait]
impl ProviderAdapter for AnthropicAdapter {
    fn description(&self) -> ModelDescription {
        self.description.clone()
    }

    fn to_provider_format(&self, rendered: &[WireMessage]) -> serde_json::Value {
        let mut system_parts = Vec::new();
        let mut turns = Vec::new();
        for m in rendered {
            if m.role == Role::System {
                if !m.content.is_empty() {
                    system_parts.push(m.content.clone());
                }
            } else {
                turns.push(ApiMessage {
                    role: m.role.to_string(),
                    content: m.content.clone(),
                });
            }
        }

        if turns.first().map(|t| t.role.as_str()) != Some("user") {
            turns.insert(
                0,
                ApiMessage {
                    role: Role::User.to_string(),
                    content: SYNTHETIC_OPENING_TURN.to_string(),
                },
            );
        }

        let request = MessageRequest {
            model: self.description.model_name.clone(),
            messages: turns,
            system: if system_parts.is_empty() {
                None
            } else {
                Some(system_parts.join("\n"))
            },
            max_tokens: self.max_output_tokens,
        };
        serde_json::to_value(request).unwrap_or_default()
    }

    fn parse_response(&self, raw: serde_json::Value) -> Result<Message, BanterError> {
        let response: MessageResponse = serde_json::from_value(raw).map_err(|e| {
            BanterError::Provider {
                message: format!("failed to parse API response: {e}"),
                source: Some(Box::new(e)),
            }
        })?;

        let block = response
            .content
            .into_iter()
            .next()
            .ok_or(BanterError::EmptyCompletion)?;
        let ContentBlock::Text { text } = block;
        let role = Role::parse(&response.role)?;
        Message::new(role, text, None, &self.counter)
    }

    async fn complete(&self, rendered: &[WireMessage]) -> Result<Message, BanterError> {
        debug!(
            model = %self.description.model_name,
            messages = rendered.len(),
            "requesting chat completion"
        );
        let body = self.to_provider_format(rendered);
        let raw = self.client.post(&body).await?;
        self.parse_response(raw)
    }
}

fn describe_model(model: &str) -> ModelDescription {
    let (name, input, output) = AVAILABLE_MODELS
        .iter()
        .find(|(name, _, _)| *name == model)
        .copied()
        .unwrap_or((model, 200_000, 4_096));
    ModelDescription::new(name, input, output)
}

fn resolve_api_key(configured: &Option<String>) -> Result<String, BanterError> {
    if let Some(key) = configured {
        return Ok(key.clone());
    }
    std::env::var(API_KEY_ENV).map_err(|_| {
        BanterError::Config(format!(
            "no Anthropic API key: set anthropic.api_key or {API_KEY_ENV}"
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config() -> AnthropicConfig {
        AnthropicConfig {
            api_key: Some("test-api-key".into()),
            default_model: Some("claude-3-haiku-20240307".into()),
            max_output_tokens: Some(1024),
            timeout_secs: 5,
            api_version: "2023-06-01".into(),
        }
    }

    fn test_adapter(base_url: &str) -> AnthropicAdapter {
        AnthropicAdapter::new(&test_config(), TokenCounter::Words)
            .unwrap()
            .with_base_url(base_url.to_string())
    }

    fn adapter() -> AnthropicAdapter {
        AnthropicAdapter::new(&test_config(), TokenCounter::Words).unwrap()
    }

    fn completion_body(text: &str) -> serde_json::Value {
        serde_json::json!({
            "id": "msg_test",
            "type": "message",
            "role": "assistant",
            "content": [{"type": "text", "text": text}],
            "model": "claude-3-haiku-20240307",
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 10, "output_tokens": 5}
        })
    }

    #[test]
    fn system_moves_to_side_channel_and_sequence_starts_with_user() {
        let body = adapter().to_provider_format(&[
            WireMessage::new(Role::System, "S"),
            WireMessage::new(Role::User, "U1"),
            WireMessage::new(Role::Assistant, "A1"),
        ]);

        assert_eq!(body["system"], "S");
        let turns = body["messages"].as_array().unwrap();
        assert!(turns.iter().all(|t| t["role"] != "system"));
        assert_eq!(turns[0]["role"], "user");
        assert_eq!(turns[0]["content"], "U1");
        assert_eq!(turns[1]["role"], "assistant");
    }

    #[test]
    fn assistant_leading_sequence_gets_synthetic_user_turn() {
        let body = adapter().to_provider_format(&[
            WireMessage::new(Role::System, "S"),
            WireMessage::new(Role::Assistant, "primer answer"),
            WireMessage::new(Role::User, "question"),
        ]);

        let turns = body["messages"].as_array().unwrap();
        assert_eq!(turns[0]["role"], "user");
        assert_eq!(turns[0]["content"], SYNTHETIC_OPENING_TURN);
        assert_eq!(turns[1]["content"], "primer answer");
    }

    #[test]
    fn empty_system_prompt_is_omitted() {
        let body = adapter().to_provider_format(&[
            WireMessage::new(Role::System, ""),
            WireMessage::new(Role::User, "hello"),
        ]);
        assert!(body.get("system").is_none());
    }

    #[test]
    fn multiple_system_entries_are_joined_in_order() {
        let body = adapter().to_provider_format(&[
            WireMessage::new(Role::System, "first"),
            WireMessage::new(Role::User, "hi"),
            WireMessage::new(Role::System, "second"),
        ]);
        assert_eq!(body["system"], "first\nsecond");
    }

    #[test]
    fn parse_response_round_trips_content() {
        let message = adapter().parse_response(completion_body("Hi there!")).unwrap();
        assert_eq!(message.role(), Role::Assistant);
        assert_eq!(message.content(), "Hi there!");
    }

    #[test]
    fn empty_content_is_empty_completion() {
        let err = adapter()
            .parse_response(serde_json::json!({"role": "assistant", "content": []}))
            .unwrap_err();
        assert!(matches!(err, BanterError::EmptyCompletion));
    }

    #[tokio::test]
    async fn complete_sends_version_and_key_headers() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/"))
            .and(header("x-api-key", "test-api-key"))
            .and(header("anthropic-version", "2023-06-01"))
            .and(body_partial_json(serde_json::json!({
                "model": "claude-3-haiku-20240307",
                "max_tokens": 1024
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("ok")))
            .mount(&server)
            .await;

        let adapter = test_adapter(&server.uri());
        let message = adapter
            .complete(&[WireMessage::new(Role::User, "hello")])
            .await
            .unwrap();
        assert_eq!(message.content(), "ok");
    }

    #[tokio::test]
    async fn complete_surfaces_api_error_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": {"type": "invalid_request_error", "message": "bad model"}
            })))
            .mount(&server)
            .await;

        let adapter = test_adapter(&server.uri());
        let err = adapter
            .complete(&[WireMessage::new(Role::User, "hello")])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("invalid_request_error"), "{err}");
    }

    #[tokio::test]
    async fn slow_response_maps_to_timeout_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(completion_body("late"))
                    .set_delay(std::time::Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let config = AnthropicConfig {
            timeout_secs: 1,
            ..test_config()
        };
        let adapter = AnthropicAdapter::new(&config, TokenCounter::Words)
            .unwrap()
            .with_base_url(server.uri());
        let err = adapter
            .complete(&[WireMessage::new(Role::User, "hello")])
            .await
            .unwrap_err();
        assert!(matches!(err, BanterError::Timeout { .. }), "{err}");
    }

    #[tokio::test]
    async fn complete_maps_transport_failure_to_provider_error() {
        let server = MockServer::start().await;
        let uri = server.uri();
        drop(server);

        let adapter = test_adapter(&uri);
        let err = adapter
            .complete(&[WireMessage::new(Role::User, "hello")])
            .await
            .unwrap_err();
        assert!(matches!(err, BanterError::Provider { .. }), "{err}");
    }
}
