//! In-memory conversation model.
//!
//! Owns the ordered message list and its two invariants: index 0 is always
//! the system message, and messages are append-only except for the single
//! trailing assistant entry while it is still streaming.

use chat_types::message::{Message, Role};
use chat_types::{ChatError, Result};

/// Identity of one pending assistant reply. Obtained from `begin_reply`
/// and required by every mutation of that reply; a stale handle is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplyHandle(u64);

pub struct Conversation {
    messages: Vec<Message>,
    /// Handle of the reply currently streaming, if any.
    pending: Option<ReplyHandle>,
    next_reply: u64,
}

impl Conversation {
    /// New conversation holding only the system message.
    pub fn new(instruction: &str) -> Self {
        Self {
            messages: vec![Message::system(instruction)],
            pending: None,
            next_reply: 0,
        }
    }

    /// Build a conversation from stored messages. If no system entry is
    /// present, one is prepended from `fallback_instruction`.
    pub fn load(messages: Vec<Message>, fallback_instruction: &str) -> Self {
        let messages = if messages.iter().any(Message::is_system) {
            messages
        } else {
            let mut with_system = vec![Message::system(fallback_instruction)];
            with_system.extend(messages);
            with_system
        };
        Self {
            messages,
            pending: None,
            next_reply: 0,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Messages without the leading system entry, for display and export.
    pub fn visible_messages(&self) -> &[Message] {
        &self.messages[1..]
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        // A conversation always carries its system message; "empty" means
        // nothing the user would see.
        self.messages.len() <= 1
    }

    pub fn system_instruction(&self) -> &str {
        &self.messages[0].content
    }

    /// Append a user message. Blank input is rejected before any mutation.
    pub fn push_user(&mut self, text: &str) -> Result<()> {
        if text.trim().is_empty() {
            return Err(ChatError::Validation(
                "message cannot be empty".to_string(),
            ));
        }
        self.messages.push(Message::user(text));
        Ok(())
    }

    /// Append an empty assistant placeholder and return the handle used to
    /// stream content into it.
    pub fn begin_reply(&mut self) -> ReplyHandle {
        let handle = ReplyHandle(self.next_reply);
        self.next_reply += 1;
        self.messages.push(Message::assistant(""));
        self.pending = Some(handle);
        handle
    }

    /// Concatenate a streamed fragment onto the pending reply. A handle
    /// that no longer refers to the trailing pending entry does nothing;
    /// a non-trailing message is never mutated.
    pub fn append_delta(&mut self, handle: ReplyHandle, fragment: &str) {
        if self.pending != Some(handle) {
            return;
        }
        match self.messages.last_mut() {
            Some(last) if last.role == Role::Assistant => {
                last.content.push_str(fragment);
            }
            _ => {}
        }
    }

    /// Seal the pending reply; its content is immutable from here on.
    pub fn finish_reply(&mut self, handle: ReplyHandle) {
        if self.pending == Some(handle) {
            self.pending = None;
        }
    }

    /// Remove the placeholder for a failed turn. Targets the reply by
    /// handle identity, never by position; returns whether an entry was
    /// removed. The user message preceding it is retained.
    pub fn abort_reply(&mut self, handle: ReplyHandle) -> bool {
        if self.pending != Some(handle) {
            return false;
        }
        self.pending = None;
        match self.messages.last() {
            Some(last) if last.role == Role::Assistant => {
                self.messages.pop();
                true
            }
            _ => false,
        }
    }

    /// Rewrite the leading system entry in place. No other message changes.
    pub fn set_system_instruction(&mut self, text: &str) {
        self.messages[0] = Message::system(text);
    }

    /// Back to a single system message.
    pub fn reset(&mut self, instruction: &str) {
        self.messages.clear();
        self.messages.push(Message::system(instruction));
        self.pending = None;
    }
}
