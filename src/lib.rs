pub mod client;
pub mod debug;
pub mod models;
pub mod renderer;
pub mod transport;

pub use client::{ChatClient, COMPLETIONS_PATH, DEFAULT_TIMEOUT};
pub use debug::DebugLog;
pub use models::{
    ApiError, ApiErrorKind, ChatMessage, ChatRequest, ChatResponse, Choice, Error, ReplyMessage, Result,
    Role,
};
pub use transport::{HttpTransport, RawResponse, Transport};
