//! # Transport Adapter
//!
//! The single HTTP client shared by the text and file registry clients.
//! Nothing else in the client talks to the network.
//!
//! - fixed base URL and timeout (30 seconds by default)
//! - JSON request and response bodies by default
//! - multipart bodies for uploads, raw bytes for downloads
//! - one attempt per call: no retries, no backoff
//!
//! Error replies are decoded into [`ClientError::Server`] using the body's
//! `message` (or `error`) field, with a generic fallback when neither exists.

use futures_util::StreamExt;
use log::debug;
use reqwest::multipart::Form;
use reqwest::{RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use super::error::{ClientError, ClientResult, GENERIC_SERVER_MESSAGE};
use crate::common::messages::{codes, ErrorBody, HealthResponse};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:3000/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Best-effort transfer progress, in percent (0..=100).
pub type Progress = Arc<dyn Fn(u8) + Send + Sync>;

/// Client configuration loaded from a TOML file.
///
/// # Example TOML
///
/// ```toml
/// [client]
/// base_url = "http://clipboard.local:3000/api"
/// timeout_secs = 30
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub client: ClientInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientInfo {
    /// API root, including the `/api` prefix
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ClientInfo {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

pub struct Transport {
    http: reqwest::Client,
    base_url: Url,
}

impl Transport {
    /// Build a transport for `base_url` (e.g. `http://host:3000/api`).
    ///
    /// # Errors
    /// `Validation` if the URL cannot be used as a base, `Network` if the
    /// underlying HTTP client cannot be constructed.
    pub fn new(base_url: &str, timeout: Duration) -> ClientResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ClientError::Validation(format!("invalid base URL '{}': {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::Validation(format!(
                "invalid base URL '{}'",
                base_url
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ClientError::Network)?;

        Ok(Self { http, base_url })
    }

    pub fn from_config(config: &ClientConfig) -> ClientResult<Self> {
        Self::new(
            &config.client.base_url,
            Duration::from_secs(config.client.timeout_secs),
        )
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Join percent-encoded `segments` onto the base URL.
    pub fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    pub async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> ClientResult<T> {
        let response = self.send(self.http.get(self.url(segments))).await?;
        read_json(response).await
    }

    pub async fn post_json<B, T>(&self, segments: &[&str], body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .send(self.http.post(self.url(segments)).json(body))
            .await?;
        read_json(response).await
    }

    pub async fn delete_json<T: DeserializeOwned>(&self, segments: &[&str]) -> ClientResult<T> {
        let response = self.send(self.http.delete(self.url(segments))).await?;
        read_json(response).await
    }

    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        form: Form,
    ) -> ClientResult<T> {
        let response = self
            .send(self.http.post(self.url(segments)).multipart(form))
            .await?;
        read_json(response).await
    }

    /// Fetch a binary body, reporting progress when the length is known.
    pub async fn get_bytes(
        &self,
        segments: &[&str],
        progress: Option<Progress>,
    ) -> ClientResult<Vec<u8>> {
        let response = self.send(self.http.get(self.url(segments))).await?;
        let total = response.content_length();
        let mut data = Vec::with_capacity(total.unwrap_or(0).min(64 * 1024 * 1024) as usize);

        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(ClientError::Network)?;
            data.extend_from_slice(&chunk);
            if let (Some(report), Some(total)) = (&progress, total) {
                report(percent(data.len() as u64, total));
            }
        }
        Ok(data)
    }

    pub async fn health(&self) -> ClientResult<HealthResponse> {
        self.get_json(&["health"]).await
    }

    /// Send one request and turn non-success statuses into errors.
    async fn send(&self, request: RequestBuilder) -> ClientResult<Response> {
        let response = request.send().await.map_err(ClientError::Network)?;
        let status = response.status();
        debug!("{} {}", status.as_u16(), response.url());

        if status.is_success() {
            return Ok(response);
        }

        let bytes = response.bytes().await.unwrap_or_default();
        Err(error_from_body(status.as_u16(), &bytes))
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
    let status = response.status().as_u16();
    let bytes = response.bytes().await.map_err(ClientError::Network)?;
    serde_json::from_slice(&bytes).map_err(|e| ClientError::Server {
        status,
        code: None,
        message: format!("Unexpected response format: {}", e),
    })
}

/// Decode an error reply. A quota rejection becomes [`ClientError::Expired`].
pub(crate) fn error_from_body(status: u16, bytes: &[u8]) -> ClientError {
    let body: ErrorBody = serde_json::from_slice(bytes).unwrap_or_default();
    let message = body
        .text()
        .map(str::to_string)
        .unwrap_or_else(|| GENERIC_SERVER_MESSAGE.to_string());

    if status == 403 && body.code == Some(codes::DOWNLOAD_LIMIT_REACHED) {
        return ClientError::Expired(message);
    }

    ClientError::Server {
        status,
        code: body.code,
        message,
    }
}

pub(crate) fn percent(done: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    (done.min(total) * 100 / total) as u8
}
