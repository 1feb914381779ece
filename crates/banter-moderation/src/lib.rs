// SPDX-FileCopyrightText: 2026 Banter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI-style moderation endpoint client for the Banter engine.
//!
//! Implements [`ModerationGate`] over `POST /v1/moderations`. This layer is
//! deliberately thin: no retries and no caching (a message caches its own
//! verdict), so a verdict is the product of exactly one network call.

pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use banter_config::ModerationConfig;
use banter_core::{BanterError, ModerationGate, ModerationResult};
use reqwest::header::{HeaderMap, HeaderValue};
use tracing::{debug, info};

use crate::types::{ApiErrorResponse, ModerationRequest, ModerationResponse};

/// Base URL for the moderation endpoint.
const API_BASE_URL: &str = "https://api.openai.com/v1/moderations";

/// Environment variable consulted when the config carries no key.
const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Moderation gate backed by the OpenAI moderations endpoint.
///
/// API key resolution order: config -> `OPENAI_API_KEY` env var -> error.
#[derive(Debug, Clone)]
pub struct OpenAiModerationGate {
    client: reqwest::Client,
    model: String,
    timeout: Duration,
    base_url: String,
}

impl OpenAiModerationGate {
    /// Creates a gate from the moderation section of the config.
    pub fn new(config: &ModerationConfig) -> Result<Self, BanterError> {
        let api_key = resolve_api_key(&config.api_key)?;
        let timeout = Duration::from_secs(config.timeout_secs);

        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|e| BanterError::Config(format!("invalid API key header value: {e}")))?;
        auth.set_sensitive(true);
        headers.insert("authorization", auth);
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| BanterError::ModerationService {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        info!(model = %config.model, "moderation gate initialized");

        Ok(Self {
            client,
            model: config.model.clone(),
            timeout,
            base_url: API_BASE_URL.to_string(),
        })
    }

    /// Overrides the base URL (for testing with wiremock).
    #[cfg(test)]
    fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url;
        self
    }
}

#[async_trait]
impl ModerationGate for OpenAiModerationGate {
    async fn classify(&self, text: &str) -> Result<ModerationResult, BanterError> {
        let request = ModerationRequest {
            input: text.to_string(),
            model: self.model.clone(),
        };

        let response = self
            .client
            .post(&self.base_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    BanterError::Timeout {
                        duration: self.timeout,
                    }
                } else {
                    BanterError::ModerationService {
                        message: format!("HTTP request failed: {e}"),
                        source: Some(Box::new(e)),
                    }
                }
            })?;

        let status = response.status();
        debug!(status = %status, "moderation response received");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<ApiErrorResponse>(&body) {
                Ok(api_err) => format!(
                    "moderation API error ({}): {}",
                    api_err.error.type_, api_err.error.message
                ),
                Err(_) => format!("moderation API returned {status}: {body}"),
            };
            return Err(BanterError::ModerationService {
                message,
                source: None,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| BanterError::ModerationService {
                message: format!("failed to read response body: {e}"),
                source: Some(Box::new(e)),
            })?;

        let parsed: ModerationResponse = serde_json::from_str(&body)
            .map_err(|e| BanterError::ModerationParse(e.to_string()))?;

        let outcome = parsed
            .results
            .into_iter()
            .next()
            .ok_or_else(|| BanterError::ModerationParse("empty results array".into()))?;

        Ok(outcome.into_result())
    }
}

/// Resolves the API key from config or the environment.
fn resolve_api_key(configured: &Option<String>) -> Result<String, BanterError> {
    if let Some(key) = configured {
        return Ok(key.clone());
    }
    std::env::var(API_KEY_ENV).map_err(|_| {
        BanterError::Config(format!(
            "no moderation API key: set moderation.api_key or {API_KEY_ENV}"
        ))
    })
}
