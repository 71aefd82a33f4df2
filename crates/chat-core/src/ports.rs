//! Port traits — the boundary between core logic and browser adapters.
//!
//! These traits are defined here in `chat-core` (pure Rust).
//! Implementations live in `chat-platform` (browser adapters).
//! The core never imports platform code; it only depends on these traits.

use std::pin::Pin;
use async_trait::async_trait;
use futures::Stream;
use chat_types::message::Message;
use chat_types::Result;

// ─── Completion Port ─────────────────────────────────────────

/// Incremental event from a streamed assistant reply.
#[derive(Debug, Clone)]
pub enum StreamEvent {
    /// A content fragment, to be applied in arrival order
    Delta(String),
    /// Terminal sentinel reached, or the connection closed cleanly
    Done,
    /// The stream broke mid-reply
    Error(String),
}

/// One chat-completion exchange.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub messages: Vec<Message>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Complete (non-streaming) response.
#[derive(Debug, Clone)]
pub struct ChatResponse {
    pub message: Message,
    pub usage: Option<TokenUsage>,
}

#[derive(Debug, Clone, Default)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

pub type ReplyStream = Pin<Box<dyn Stream<Item = StreamEvent>>>;

#[async_trait(?Send)]
pub trait CompletionPort {
    /// Open a streamed completion. Request-level failures (transport,
    /// non-success status, missing body) surface as `Err` before any
    /// delta is produced; mid-stream failures arrive as
    /// `StreamEvent::Error`.
    async fn stream_chat(&self, req: ChatRequest) -> Result<ReplyStream>;

    /// Legacy non-streaming completion (`choices[0].message`).
    async fn chat_completion(&self, req: ChatRequest) -> Result<ChatResponse>;
}

// ─── Store Port ──────────────────────────────────────────────

/// Narrow key/value abstraction over durable browser-local storage.
/// Synchronous by design: the backing store (`localStorage`) is.
pub trait StorePort {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    fn remove(&self, key: &str) -> Result<()>;

    /// Subscribe to changes made to `key` by another tab. The callback
    /// receives the new value, or `None` when the key was removed.
    /// Changes made through this same adapter do not notify.
    fn on_external_change(&self, key: &str, callback: Box<dyn Fn(Option<String>)>);

    /// Name of this backend (for logging/debug)
    fn backend_name(&self) -> &str;
}
