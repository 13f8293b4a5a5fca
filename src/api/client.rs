use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::config::Config;
use crate::error::{MonitorError, MonitorResult, NetworkError};

/// Issues `GET` requests against the sensor API and returns the parsed JSON body.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch `path` (path plus query string, e.g. `/api/sensor-data?limit=60`).
    ///
    /// # Errors
    ///
    /// Returns `MonitorError::Network` if the request fails or the status is not 2xx,
    /// and `MonitorError::MalformedResponse` if the body is not JSON.
    async fn fetch_json(&self, path: &str) -> MonitorResult<Value>;
}

pub struct ApiClient {
    http_client: Client,
    base_url: String,
}

impl ApiClient {
    /// Build a client for `config.api_base_url`.
    ///
    /// # Errors
    ///
    /// Returns `MonitorError::Network` if the TLS backend cannot be initialized.
    pub fn new(config: &Config) -> MonitorResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let http_client = builder
            .build()
            .map_err(|e| NetworkError::Transport(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Transport for ApiClient {
    async fn fetch_json(&self, path: &str) -> MonitorResult<Value> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(url = %url, "GET");

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| NetworkError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NetworkError::Status {
                code: status.as_u16(),
                text: status.canonical_reason().unwrap_or_default().to_string(),
            }
            .into());
        }

        let text = response
            .text()
            .await
            .map_err(|e| NetworkError::Transport(format!("Failed to get response text: {e}")))?;

        serde_json::from_str(&text).map_err(|e| {
            tracing::error!(
                error = %e,
                url = %url,
                body_preview = %text.chars().take(200).collect::<String>(),
                "Failed to parse response body"
            );
            MonitorError::MalformedResponse(format!("{path}: {e}"))
        })
    }
}
