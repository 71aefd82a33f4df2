use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum ChatError {
    /// Rejected before any side effect: empty input, empty archive name,
    /// missing credential.
    #[error("{0}")]
    Validation(String),

    /// Network failure, non-success HTTP status, or missing response body.
    /// Aborts the current turn.
    #[error("request failed: {0}")]
    Transport(String),

    /// Malformed payload in a single streamed event or response body.
    #[error("decode error: {0}")]
    Decode(String),

    /// Corrupted persisted archive data. Recovered as an empty archive.
    #[error("corrupt stored data: {0}")]
    PersistenceDecode(String),

    /// The underlying key/value store rejected an operation.
    #[error("storage error: {0}")]
    Store(String),

    /// A request is already in flight for this conversation.
    #[error("a request is already in flight")]
    Busy,
}

impl From<serde_json::Error> for ChatError {
    fn from(e: serde_json::Error) -> Self {
        ChatError::Decode(e.to_string())
    }
}
