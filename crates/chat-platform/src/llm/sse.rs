//! Incremental decoding of the streamed completion framing.
//!
//! The response is newline-delimited; each event line carries a `data:`
//! prefix and either a JSON fragment with a content delta or the literal
//! `[DONE]` sentinel. Network chunks do not align with line boundaries,
//! so bytes are buffered until a full line is available — lines are
//! always handed out in arrival order.

use chat_types::{ChatError, Result};
use serde::Deserialize;

pub const EVENT_PREFIX: &str = "data:";
pub const DONE_SENTINEL: &str = "[DONE]";

/// Assembles complete lines from arbitrarily sliced byte chunks.
/// Buffering bytes (not text) also keeps multi-byte characters split
/// across chunks intact.
#[derive(Default)]
pub struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one network chunk; returns every line completed by it,
    /// in order. The unfinished tail stays buffered.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);
        let mut lines = Vec::new();
        while let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
            let rest = self.pending.split_off(pos + 1);
            let mut line = std::mem::replace(&mut self.pending, rest);
            line.pop(); // the newline
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            lines.push(String::from_utf8_lossy(&line).into_owned());
        }
        lines
    }
}

/// Decoded meaning of one event line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SsePayload {
    /// A content fragment to append
    Delta(String),
    /// Terminal sentinel — the stream is over
    Done,
    /// Not an event, or an event without content (e.g. role-only delta)
    Ignored,
}

#[derive(Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

#[derive(Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: StreamDelta,
}

#[derive(Deserialize, Default)]
struct StreamDelta {
    #[serde(default)]
    content: Option<String>,
}

/// Parse one line of the event framing. Lines without the event prefix
/// are ignored; malformed JSON in an event payload is an error the
/// caller is expected to skip and log, not propagate.
pub fn parse_line(line: &str) -> Result<SsePayload> {
    let trimmed = line.trim();
    if trimmed.is_empty() || !trimmed.starts_with(EVENT_PREFIX) {
        return Ok(SsePayload::Ignored);
    }
    let payload = trimmed[EVENT_PREFIX.len()..].trim();
    if payload == DONE_SENTINEL {
        return Ok(SsePayload::Done);
    }
    let chunk: StreamChunk =
        serde_json::from_str(payload).map_err(|e| ChatError::Decode(e.to_string()))?;
    match chunk.choices.into_iter().next().and_then(|c| c.delta.content) {
        Some(content) if !content.is_empty() => Ok(SsePayload::Delta(content)),
        _ => Ok(SsePayload::Ignored),
    }
}
