use serde::{Deserialize, Deserializer, Serialize};
use std::borrow::Cow;

/// Longest slice of an undecodable body kept in [`Error::DecodeResponse`].
const EXCERPT_LIMIT: usize = 256;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f64,
}

impl ChatRequest {
    /// Builds the fixed `[system, user]` exchange sent on every completion.
    pub fn new(
        model: impl Into<String>,
        system_prompt: impl Into<String>,
        user_prompt: impl Into<String>,
        temperature: f64,
    ) -> Self {
        Self {
            model: model.into(),
            messages: vec![
                ChatMessage::system(system_prompt),
                ChatMessage::user(user_prompt),
            ],
            temperature,
        }
    }
}

/// Message as returned by the service. Roles are kept as sent, and a
/// `null` or missing `content` reads as an empty reply.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ReplyMessage {
    #[serde(default)]
    pub role: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub content: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Choice {
    pub index: u32,
    pub message: ReplyMessage,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ChatResponse {
    pub id: String,
    pub object: String,
    pub created: i64,
    pub choices: Vec<Choice>,
}

impl ChatResponse {
    /// Content of the first choice, if the service returned any.
    pub fn first_content(&self) -> Option<&str> {
        self.choices.first().map(|choice| choice.message.content.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    Unauthorized,
    RateLimited,
    Server,
    Other,
}

/// Non-success reply from the service. `body` holds the raw bytes as received.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("API request failed with status code {status}: {}", String::from_utf8_lossy(.body))]
pub struct ApiError {
    pub status: u16,
    pub body: Vec<u8>,
}

impl ApiError {
    /// Body as text, with invalid UTF-8 replaced.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    pub fn kind(&self) -> ApiErrorKind {
        match self.status {
            401 | 403 => ApiErrorKind::Unauthorized,
            429 => ApiErrorKind::RateLimited,
            500..=599 => ApiErrorKind::Server,
            _ => ApiErrorKind::Other,
        }
    }
}

// Error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("error serializing request body: {0}")]
    SerializeRequest(#[source] serde_json::Error),
    #[error("error decoding response: {source} (body: {excerpt})")]
    DecodeResponse {
        #[source]
        source: serde_json::Error,
        excerpt: String,
    },
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("request cancelled")]
    Cancelled,
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("no choices in response")]
    NoChoices,
}

impl Error {
    pub fn transport(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Error::Transport(err.into())
    }

    pub(crate) fn decode(source: serde_json::Error, body: &[u8]) -> Self {
        Error::DecodeResponse {
            source,
            excerpt: excerpt(body),
        }
    }

    pub fn is_serialization(&self) -> bool {
        matches!(self, Error::SerializeRequest(_) | Error::DecodeResponse { .. })
    }

    /// Network-level failures, caller cancellation included.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_) | Error::Cancelled)
    }

    pub fn api(&self) -> Option<&ApiError> {
        match self {
            Error::Api(err) => Some(err),
            _ => None,
        }
    }
}

fn excerpt(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    match text.char_indices().nth(EXCERPT_LIMIT) {
        Some((cut, _)) => format!("{}…", &text[..cut]),
        None => text.into_owned(),
    }
}

pub type Result<T> = std::result::Result<T, Error>;
