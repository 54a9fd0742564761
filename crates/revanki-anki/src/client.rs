use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// AnkiConnect API version every request is sent with
pub const API_VERSION: u32 = 6;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BridgeError {
    /// Error reported by AnkiConnect itself
    #[error("{0}")]
    Remote(String),

    #[error("Failed to connect to AnkiConnect. Is Anki running?")]
    Unreachable,

    #[error("AnkiConnect request timed out")]
    Timeout,

    #[error("Failed to parse AnkiConnect response")]
    BadResponse,
}

impl BridgeError {
    fn from_transport(err: reqwest::Error) -> Self {
        tracing::debug!("AnkiConnect transport error: {err}");
        if err.is_timeout() {
            BridgeError::Timeout
        } else {
            BridgeError::Unreachable
        }
    }
}

/// One action at a time against the automation endpoint
#[async_trait::async_trait]
pub trait AnkiBridge: Send + Sync {
    /// Send `action` with `params` and return the `result` field
    async fn invoke(&self, action: &str, params: Value) -> Result<Value, BridgeError>;
}

#[derive(Clone)]
pub struct AnkiConnectClient {
    base_url: String,
    client: reqwest::Client,
}

impl AnkiConnectClient {
    pub fn new(base_url: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build AnkiConnect HTTP client")?;

        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait::async_trait]
impl AnkiBridge for AnkiConnectClient {
    async fn invoke(&self, action: &str, params: Value) -> Result<Value, BridgeError> {
        let request = AnkiRequest {
            action,
            version: API_VERSION,
            params,
        };

        tracing::debug!("AnkiConnect -> {action}");

        let response = self
            .client
            .post(&self.base_url)
            .json(&request)
            .send()
            .await
            .map_err(BridgeError::from_transport)?;

        let body = response
            .text()
            .await
            .map_err(BridgeError::from_transport)?;

        let parsed: AnkiResponse = serde_json::from_str(&body).map_err(|e| {
            tracing::warn!("Unparsable AnkiConnect response for {action}: {e}");
            BridgeError::BadResponse
        })?;

        parsed.into_result()
    }
}

#[derive(Serialize)]
struct AnkiRequest<'a> {
    action: &'a str,
    version: u32,
    params: Value,
}

#[derive(Deserialize)]
struct AnkiResponse {
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Option<String>,
}

impl AnkiResponse {
    fn into_result(self) -> Result<Value, BridgeError> {
        if let Some(error) = self.error {
            return Err(BridgeError::Remote(error));
        }

        Ok(self.result)
    }
}
