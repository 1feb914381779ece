// SPDX-FileCopyrightText: 2026 Banter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Groq chat-completions adapter.
//!
//! Groq exposes an OpenAI-compatible surface, so this is the second
//! flat-role backend: the rendered list passes through unchanged.

pub mod client;
pub mod types;

use async_trait::async_trait;
use banter_config::ProviderConfig;
use banter_core::{
    BanterError, Message, ModelDescription, ProviderAdapter, Role, TokenCounter, WireMessage,
};
use tracing::debug;

use crate::client::GroqClient;
use crate::types::{ChatRequest, ChatRequestMessage, ChatResponse};

/// Environment variable consulted when the config carries no key.
const API_KEY_ENV: &str = "GROQ_API_KEY";

/// Known models with their published token ceilings.
/// <https://console.groq.com/docs/models>
pub const AVAILABLE_MODELS: &[(&str, u32, u32)] = &[
    ("llama3-8b-8192", 8_192, 8_192),
    ("llama3-70b-8192", 8_192, 8_192),
    ("mixtral-8x7b-32768", 32_768, 32_768),
    ("gemma-7b-it", 8_192, 8_192),
];

const DEFAULT_MODEL: &str = "llama3-8b-8192";

/// [`ProviderAdapter`] for the Groq chat-completions API.
pub struct GroqAdapter {
    client: GroqClient,
    description: ModelDescription,
    max_output_tokens: Option<u32>,
    counter: TokenCounter,
}

impl GroqAdapter {
    /// Creates an adapter from the `groq` config section. The API key
    /// resolves config first, then `GROQ_API_KEY`.
    pub fn new(config: &ProviderConfig, counter: TokenCounter) -> Result<Self, BanterError> {
        let api_key = resolve_api_key(&config.api_key)?;
        let model = config.default_model.as_deref().unwrap_or(DEFAULT_MODEL);
        let description = describe_model(model);

        Ok(Self {
            client: GroqClient::new(&api_key, config.timeout_secs)?,
            max_output_tokens: config.max_output_tokens.or(Some(description.max_output_tokens)),
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
impl ProviderAdapter for GroqAdapter {
    fn description(&self) -> ModelDescription {
        self.description.clone()
    }

    fn to_provider_format(&self, rendered: &[WireMessage]) -> serde_json::Value {
        let request = ChatRequest {
            model: self.description.model_name.clone(),
            messages: rendered
                .iter()
                .map(|m| ChatRequestMessage {
                    role: m.role.to_string(),
                    content: m.content.clone(),
                })
                .collect(),
            max_tokens: self.max_output_tokens,
        };
        serde_json::to_value(request).unwrap_or_default()
    }

    fn parse_response(&self, raw: serde_json::Value) -> Result<Message, BanterError> {
        let response: ChatResponse = serde_json::from_value(raw).map_err(|e| {
            BanterError::Provider {
                message: format!("failed to parse API response: {e}"),
                source: Some(Box::new(e)),
            }
        })?;

        let choice = response.choices.into_iter().next().ok_or(BanterError::EmptyCompletion)?;
        let content = choice.message.content.ok_or(BanterError::EmptyCompletion)?;
        let role = Role::parse(&choice.message.role)?;
        Message::new(role, content, None, &self.counter)
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
        .unwrap_or((model, 8_192, 8_192));
    ModelDescription::new(name, input, output)
}

fn resolve_api_key(configured: &Option<String>) -> Result<String, BanterError> {
    if let Some(key) = configured {
        return Ok(key.clone());
    }
    std::env::var(API_KEY_ENV).map_err(|_| {
        BanterError::Config(format!("no Groq API key: set groq.api_key or {API_KEY_ENV}"))
    })
}
