// SPDX-FileCopyrightText: 2026 Banter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Google Gemini adapter.
//!
//! An alternating-with-relabeling backend: Gemini accepts only `user` and
//! `model` roles in strict alternation. System-role entries are relabeled
//! to `user`, assistant-role entries to `model`, and when the sequence
//! opens with a relabeled system turn a synthetic `model` acknowledgement
//! is inserted right after it so alternation holds.

pub mod client;
pub mod types;

use async_trait::async_trait;
use banter_config::ProviderConfig;
use banter_core::{
    BanterError, Message, ModelDescription, ProviderAdapter, Role, TokenCounter, WireMessage,
};
use tracing::debug;

use crate::client::GeminiClient;
use crate::types::{Content, GenerateRequest, GenerateResponse, GenerationConfig, Part};

/// Environment variable consulted when the config carries no key.
const API_KEY_ENV: &str = "GOOGLE_API_KEY";

/// Gemini's name for the assistant role.
const MODEL_ROLE: &str = "model";

/// Acknowledgement turn inserted after a relabeled system prompt.
const SYNTHETIC_ACK: &str = "Understood.";

/// Known models with their published token ceilings.
pub const AVAILABLE_MODELS: &[(&str, u32, u32)] = &[("gemini-pro", 30_720, 2_048)];

const DEFAULT_MODEL: &str = "gemini-pro";

/// [`ProviderAdapter`] for the Gemini `generateContent` API.
pub struct GeminiAdapter {
    client: GeminiClient,
    description: ModelDescription,
    max_output_tokens: Option<u32>,
    counter: TokenCounter,
}

impl GeminiAdapter {
    /// Creates an adapter from the `google` config section. The API key
    /// resolves config first, then `GOOGLE_API_KEY`.
    pub fn new(config: &ProviderConfig, counter: TokenCounter) -> Result<Self, BanterError> {
        let api_key = resolve_api_key(&config.api_key)?;
        let model = config.default_model.as_deref().unwrap_or(DEFAULT_MODEL);
        let description = describe_model(model);

        Ok(Self {
            client: GeminiClient::new(&api_key, config.timeout_secs)?,
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
impl ProviderAdapter for GeminiAdapter {
    fn description(&self) -> ModelDescription {
        self.description.clone()
    }

    fn to_provider_format(&self, rendered: &[WireMessage]) -> serde_json::Value {
        let mut contents = Vec::with_capacity(rendered.len() + 1);
        for (i, m) in rendered.iter().enumerate() {
            let role = match m.role {
                Role::Assistant => MODEL_ROLE.to_string(),
                // System turns become user turns.
                Role::System | Role::User => Role::User.to_string(),
                other => other.to_string(),
            };
            contents.push(Content {
                role,
                parts: vec![Part {
                    text: m.content.clone(),
                }],
            });
            // A leading system prompt needs a model acknowledgement so the
            // sequence alternates user/model from the start.
            if i == 0 && m.role == Role::System {
                contents.push(Content {
                    role: MODEL_ROLE.to_string(),
                    parts: vec![Part {
                        text: SYNTHETIC_ACK.to_string(),
                    }],
                });
            }
        }

        let request = GenerateRequest {
            contents,
            generation_config: self
                .max_output_tokens
                .map(|max_output_tokens| GenerationConfig { max_output_tokens }),
        };
        serde_json::to_value(request).unwrap_or_default()
    }

    fn parse_response(&self, raw: serde_json::Value) -> Result<Message, BanterError> {
        let response: GenerateResponse = serde_json::from_value(raw).map_err(|e| {
            BanterError::Provider {
                message: format!("failed to parse API response: {e}"),
                source: Some(Box::new(e)),
            }
        })?;

        let candidate = response
            .candidates
            .into_iter()
            .next()
            .ok_or(BanterError::EmptyCompletion)?;
        if candidate.content.parts.is_empty() {
            return Err(BanterError::EmptyCompletion);
        }
        let text: String = candidate
            .content
            .parts
            .into_iter()
            .map(|p| p.text)
            .collect::<Vec<_>>()
            .join("");

        // The model role maps back to assistant in the canonical vocabulary.
        let role = if candidate.content.role == MODEL_ROLE {
            Role::Assistant
        } else {
            Role::parse(&candidate.content.role)?
        };
        Message::new(role, text, None, &self.counter)
    }

    async fn complete(&self, rendered: &[WireMessage]) -> Result<Message, BanterError> {
        debug!(
            model = %self.description.model_name,
            messages = rendered.len(),
            "requesting chat completion"
        );
        let body = self.to_provider_format(rendered);
        let raw = self.client.post(&self.description.model_name, &body).await?;
        self.parse_response(raw)
    }
}

fn describe_model(model: &str) -> ModelDescription {
    let (name, input, output) = AVAILABLE_MODELS
        .iter()
        .find(|(name, _, _)| *name == model)
        .copied()
        .unwrap_or((model, 30_720, 2_048));
    ModelDescription::new(name, input, output)
}

fn resolve_api_key(configured: &Option<String>) -> Result<String, BanterError> {
    if let Some(key) = configured {
        return Ok(key.clone());
    }
    std::env::var(API_KEY_ENV).map_err(|_| {
        BanterError::Config(format!("no Google API key: set google.api_key or {API_KEY_ENV}"))
    })
}
