use crate::debug::DebugLog;
use crate::models::{ApiError, ChatRequest, ChatResponse, Error, Result};
use crate::transport::{HttpTransport, Transport};
use std::fmt;
use std::io::Write;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const COMPLETIONS_PATH: &str = "/v1/chat/completions";

/// Single-shot client for an OpenAI-compatible chat completion endpoint.
///
/// Holds no per-call state, so one instance can serve concurrent callers
/// behind a shared reference or an `Arc`.
pub struct ChatClient {
    base_url: String,
    api_key: String,
    model: String,
    debug: DebugLog,
    transport: Box<dyn Transport>,
}

impl ChatClient {
    /// No validation happens here; a bad URL or key shows up on the first call.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self::with_timeout(base_url, api_key, model, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self::with_transport(base_url, api_key, model, HttpTransport::new(timeout))
    }

    pub fn with_transport(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        transport: impl Transport + 'static,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            debug: DebugLog::stderr(),
            transport: Box::new(transport),
        }
    }

    /// Redirects debug output away from stderr. The current flag is kept.
    pub fn with_debug_writer(mut self, writer: impl Write + Send + 'static) -> Self {
        let enabled = self.debug.is_enabled();
        self.debug = DebugLog::with_writer(writer);
        self.debug.set_enabled(enabled);
        self
    }

    pub fn set_debug(&self, enabled: bool) {
        self.debug.set_enabled(enabled);
    }

    pub fn is_debug(&self) -> bool {
        self.debug.is_enabled()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, COMPLETIONS_PATH)
    }

    /// Sends `system_prompt` and `user_prompt` and returns the first choice's
    /// content verbatim. `temperature` goes out as given; the service decides
    /// whether it is acceptable.
    #[tracing::instrument(skip_all, fields(model = %self.model))]
    pub async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        temperature: f64,
    ) -> Result<String> {
        let request = ChatRequest::new(self.model.as_str(), system_prompt, user_prompt, temperature);
        let body = serde_json::to_vec(&request).map_err(Error::SerializeRequest)?;
        self.debug.log("Request body", &body);

        tracing::debug!(bytes = body.len(), "sending chat completion");
        let response = self
            .transport
            .post_json(&self.endpoint(), &self.api_key, body)
            .await?;
        self.debug.log("Response body", &response.body);

        if response.status != 200 {
            tracing::warn!(status = response.status, "chat completion rejected");
            return Err(ApiError {
                status: response.status,
                body: response.body,
            }
            .into());
        }

        let parsed: ChatResponse =
            serde_json::from_slice(&response.body).map_err(|e| Error::decode(e, &response.body))?;

        parsed
            .first_content()
            .map(str::to_owned)
            .ok_or(Error::NoChoices)
    }

    /// Like [`complete`](Self::complete), but gives up as soon as `cancel`
    /// fires. The in-flight request is dropped, which closes its connection.
    pub async fn complete_with_cancellation(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        temperature: f64,
        cancel: &CancellationToken,
    ) -> Result<String> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!("chat completion cancelled");
                Err(Error::Cancelled)
            }
            result = self.complete(system_prompt, user_prompt, temperature) => result,
        }
    }
}

impl fmt::Debug for ChatClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("debug", &self.debug.is_enabled())
            .finish()
    }
}
