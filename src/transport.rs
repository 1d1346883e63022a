use crate::models::{Error, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use std::time::Duration;

/// Status and fully-read body of an HTTP reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// One authenticated JSON POST. Every failure to obtain a complete reply,
/// including a body that breaks off mid-read, is an [`Error::Transport`].
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post_json(&self, url: &str, api_key: &str, body: Vec<u8>) -> Result<RawResponse>;
}

pub struct HttpTransport {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpTransport {
    /// `timeout` bounds the whole exchange, from connect to the last body byte.
    pub fn new(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(Duration::from_secs(30))
            .pool_max_idle_per_host(10)
            .build()
            .unwrap_or_else(|err| {
                tracing::warn!(error = %err, "falling back to default HTTP client");
                reqwest::Client::new()
            });

        Self::from_client(client, timeout)
    }

    /// Uses an existing client. `timeout` is applied to every request on top
    /// of whatever the client was built with.
    pub fn from_client(client: reqwest::Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_json(&self, url: &str, api_key: &str, body: Vec<u8>) -> Result<RawResponse> {
        let response = self
            .client
            .post(url)
            .timeout(self.timeout)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .header(AUTHORIZATION, format!("Bearer {}", api_key))
            .body(body)
            .send()
            .await
            .map_err(Error::transport)?;

        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(Error::transport)?;

        Ok(RawResponse {
            status,
            body: body.to_vec(),
        })
    }
}
