// src/infrastructure/rest.rs
//
// Client for key-value stores that accept Redis commands over HTTP: each
// command is POSTed as a JSON array and answered with `{"result": ...}` or
// `{"error": "..."}`. Values are stored as JSON-encoded strings.
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::application::{KeyValueStore, StorageTier, StoreKey};
use crate::constants::STORE_CONNECT_TIMEOUT_SECS;
use crate::domain::DomainError;

#[derive(Error, Debug)]
pub enum RestStoreError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Server error: {status} - {message}")]
    Server { status: u16, message: String },
    #[error("Store rejected command: {0}")]
    Command(String),
    #[error("Unexpected response: {0}")]
    Protocol(String),
    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("Store connection is closed")]
    Closed,
}

impl From<RestStoreError> for DomainError {
    fn from(e: RestStoreError) -> Self {
        DomainError::Storage(e.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct CommandResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<String>,
}

/// Turn a command response into its `result` value.
pub(crate) fn decode_response(status: StatusCode, body: &str) -> Result<Value, RestStoreError> {
    if !status.is_success() {
        let message = serde_json::from_str::<CommandResponse>(body)
            .ok()
            .and_then(|r| r.error)
            .unwrap_or_else(|| body.to_string());
        return Err(RestStoreError::Server {
            status: status.as_u16(),
            message,
        });
    }

    let response: CommandResponse = serde_json::from_str(body)?;
    if let Some(error) = response.error {
        return Err(RestStoreError::Command(error));
    }
    Ok(response.result.unwrap_or(Value::Null))
}

/// Decode a GET result: a JSON-encoded string, or nothing.
pub(crate) fn decode_stored(key: StoreKey, result: Value) -> Result<Value, RestStoreError> {
    match result {
        Value::Null => Ok(key.default_value()),
        Value::String(s) if s.is_empty() => Ok(key.default_value()),
        Value::String(s) => Ok(serde_json::from_str(&s)?),
        other => Err(RestStoreError::Protocol(format!(
            "expected a string for key '{}', got {}",
            key, other
        ))),
    }
}

pub struct RestStore {
    client: Client,
    url: String,
    token: Option<String>,
    closed: AtomicBool,
}

impl RestStore {
    pub fn new(url: &str, token: Option<String>, timeout: Duration) -> Result<Self, RestStoreError> {
        let url = url.trim_end_matches('/').to_string();
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(RestStoreError::InvalidUrl(format!(
                "URL must start with http:// or https://: {}",
                url
            )));
        }

        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(STORE_CONNECT_TIMEOUT_SECS))
            .build()?;

        debug!(%url, "Created REST store client");
        Ok(Self {
            client,
            url,
            token,
            closed: AtomicBool::new(false),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn command(&self, args: &[&str]) -> Result<Value, RestStoreError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(RestStoreError::Closed);
        }

        let mut request = self.client.post(&self.url).json(args);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        decode_response(status, &body)
    }

    /// Round-trip to check that the store answers.
    pub async fn ping(&self) -> Result<(), RestStoreError> {
        self.command(&["PING"]).await.map(|_| ())
    }
}

#[async_trait]
impl KeyValueStore for RestStore {
    #[instrument(level = "trace", skip(self))]
    async fn get(&self, key: StoreKey) -> Result<Value, DomainError> {
        let result = self.command(&["GET", key.as_str()]).await?;
        Ok(decode_stored(key, result)?)
    }

    #[instrument(level = "trace", skip(self, value))]
    async fn set(&self, key: StoreKey, value: Value) -> Result<(), DomainError> {
        let encoded = serde_json::to_string(&value)?;
        self.command(&["SET", key.as_str(), &encoded]).await?;
        Ok(())
    }

    fn active_tier(&self) -> StorageTier {
        StorageTier::Primary
    }

    async fn close(&self) -> Result<(), DomainError> {
        if !self.closed.swap(true, Ordering::AcqRel) {
            info!(url = %self.url, "Closed external store client");
        }
        Ok(())
    }
}
