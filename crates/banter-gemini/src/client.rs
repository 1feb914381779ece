// SPDX-FileCopyrightText: 2026 Banter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Gemini `generateContent` API.

use std::time::Duration;

use banter_core::BanterError;
use reqwest::header::{HeaderMap, HeaderValue};
use tracing::debug;

use crate::types::ApiErrorResponse;

/// Base URL for the Gemini API; the model name completes the path.
const API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// HTTP client for Gemini API communication. Key auth via the
/// `x-goog-api-key` default header; no retries, failures propagate to the
/// dispatch layer.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    timeout: Duration,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, BanterError> {
        let timeout = Duration::from_secs(timeout_secs);

        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(api_key)
            .map_err(|e| BanterError::Config(format!("invalid API key header value: {e}")))?;
        auth.set_sensitive(true);
        headers.insert("x-goog-api-key", auth);
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

    /// Posts a request body to `models/{model}:generateContent` and returns
    /// the raw response JSON.
    pub async fn post(
        &self,
        model: &str,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, BanterError> {
        let url = format!("{}/models/{model}:generateContent", self.base_url);
        let response = self.client.post(&url).json(body).send().await.map_err(|e| {
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
                    "Gemini API error ({}): {}",
                    api_err.error.status, api_err.error.message
                ),
                Err(_) => format!("Gemini API returned {status}: {body}"),
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
