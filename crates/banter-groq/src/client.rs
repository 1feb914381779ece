// SPDX-FileCopyrightText: 2026 Banter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for Groq's OpenAI-compatible completions endpoint.

use std::time::Duration;

use banter_core::BanterError;
use reqwest::header::{HeaderMap, HeaderValue};
use tracing::debug;

use crate::types::ApiErrorResponse;

/// Base URL for the Groq chat-completions endpoint.
const API_BASE_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

/// HTTP client for Groq API communication. Bearer auth via default headers;
/// no retries, failures propagate to the dispatch layer.
#[derive(Debug, Clone)]
pub struct GroqClient {
    client: reqwest::Client,
    timeout: Duration,
    base_url: String,
}

impl GroqClient {
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, BanterError> {
        let timeout = Duration::from_secs(timeout_secs);

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
            .map_err(|e| BanterError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            timeout,
            base_url: API_BASE_URL.to_string(),
        })
    }

    /// Overrides the base URL (for testing with wiremock).
    #[cfg(test)]
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url;
        self
    }

    /// Posts a request body and returns the raw response JSON.
    pub async fn post(&self, body: &serde_json::Value) -> Result<serde_json::Value, BanterError> {
        let response = self
            .client
            .post(&self.base_url)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    BanterError::Timeout {
                        duration: self.timeout,
                    }
                } else {
                    BanterError::Provider {
                        message: format!("HTTP request failed: {e}"),
                        source: Some(Box::new(e)),
                    }
                }
            })?;

        let status = response.status();
        debug!(status = %status, "completion response received");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<ApiErrorResponse>(&body) {
                Ok(api_err) => format!(
                    "Groq API error ({}): {}",
                    api_err.error.type_, api_err.error.message
                ),
                Err(_) => format!("Groq API returned {status}: {body}"),
            };
            return Err(BanterError::Provider {
                message,
                source: None,
            });
        }

        response.json().await.map_err(|e| BanterError::Provider {
            message: format!("failed to read response body: {e}"),
            source: Some(Box::new(e)),
        })
    }
}
