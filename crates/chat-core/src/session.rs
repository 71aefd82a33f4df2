//! Session orchestrator — wires user intents to the conversation model,
//! the streaming client, and the instruction layer.
//!
//! Two states: `Idle` and `AwaitingResponse`. Exactly one request is in
//! flight per session; `send`, `new_conversation`, and archive selection
//! are rejected while a turn is streaming. That single-in-flight rule is
//! what makes rollback-by-handle sound.

use std::cell::RefCell;
use std::rc::Rc;

use futures::StreamExt;

use chat_types::archive::ArchivedConversation;
use chat_types::config::ChatConfig;
use chat_types::event::SessionEvent;
use chat_types::{ChatError, Result};

use crate::conversation::{Conversation, ReplyHandle};
use crate::event_bus::EventBus;
use crate::instruction::SystemInstruction;
use crate::ports::{ChatRequest, CompletionPort, StreamEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    AwaitingResponse,
}

pub struct ChatSession {
    config: ChatConfig,
    conversation: Conversation,
    instruction: SystemInstruction,
    event_bus: EventBus,
    state: SessionState,
    /// Id of the archived entry the active conversation was loaded from.
    active_archive_id: Option<String>,
    turn_counter: u64,
}

impl ChatSession {
    pub fn new(config: ChatConfig, durable_instruction: &str, event_bus: EventBus) -> Self {
        Self {
            config,
            conversation: Conversation::new(durable_instruction),
            instruction: SystemInstruction::new(durable_instruction),
            event_bus,
            state: SessionState::Idle,
            active_archive_id: None,
            turn_counter: 0,
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn instruction(&self) -> &SystemInstruction {
        &self.instruction
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_busy(&self) -> bool {
        self.state == SessionState::AwaitingResponse
    }

    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: ChatConfig) {
        self.config = config;
    }

    pub fn active_archive_id(&self) -> Option<&str> {
        self.active_archive_id.as_deref()
    }

    /// Start one turn: validate, append the user message and the assistant
    /// placeholder, and hand back the handle plus the request to send.
    /// Nothing is mutated when validation fails.
    pub fn begin_turn(&mut self, text: &str) -> Result<(ReplyHandle, ChatRequest)> {
        if self.state == SessionState::AwaitingResponse {
            return Err(ChatError::Busy);
        }
        if text.trim().is_empty() {
            return Err(ChatError::Validation(
                "message cannot be empty".to_string(),
            ));
        }
        if !self.config.has_credential() {
            return Err(ChatError::Validation(
                "API key is not set".to_string(),
            ));
        }

        self.conversation.push_user(text)?;
        // The request carries system + history + the new user message;
        // the placeholder appended next is not sent.
        let request = ChatRequest {
            messages: self.conversation.messages().to_vec(),
            model: self.config.model.clone(),
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };
        let handle = self.conversation.begin_reply();

        self.state = SessionState::AwaitingResponse;
        self.turn_counter += 1;
        self.event_bus.emit(SessionEvent::TurnStart {
            turn_id: self.turn_counter,
        });
        Ok((handle, request))
    }

    /// Apply one streamed fragment, in arrival order.
    pub fn apply_delta(&mut self, handle: ReplyHandle, token: &str) {
        self.conversation.append_delta(handle, token);
        self.event_bus.emit(SessionEvent::AssistantDelta {
            token: token.to_string(),
        });
    }

    /// Clean end of stream; the reply becomes immutable.
    pub fn complete_turn(&mut self, handle: ReplyHandle) {
        self.conversation.finish_reply(handle);
        self.state = SessionState::Idle;
        self.event_bus.emit(SessionEvent::TurnComplete {
            turn_id: self.turn_counter,
        });
    }

    /// Failed turn: the placeholder is removed, the user message stays.
    pub fn fail_turn(&mut self, handle: ReplyHandle, message: String) {
        self.conversation.abort_reply(handle);
        self.state = SessionState::Idle;
        log::warn!("turn {} failed: {}", self.turn_counter, message);
        self.event_bus.emit(SessionEvent::TurnFailed {
            turn_id: self.turn_counter,
            message,
        });
    }

    /// Reset to a fresh conversation on the durable instruction. Ends any
    /// instruction override exactly once.
    pub fn new_conversation(&mut self) -> Result<()> {
        if self.state == SessionState::AwaitingResponse {
            return Err(ChatError::Busy);
        }
        self.instruction.end_override();
        self.conversation.reset(self.instruction.durable());
        self.active_archive_id = None;
        Ok(())
    }

    /// Make an archived conversation the active one. An entry that
    /// captured its own instruction activates override mode.
    pub fn select_archived(&mut self, entry: &ArchivedConversation) -> Result<()> {
        if self.state == SessionState::AwaitingResponse {
            return Err(ChatError::Busy);
        }
        self.instruction.end_override();
        if let Some(captured) = &entry.captured_system_instruction {
            self.instruction.activate_override(captured.clone());
        }
        self.conversation =
            Conversation::load(entry.messages.clone(), self.instruction.active());
        self.active_archive_id = Some(entry.id.clone());
        Ok(())
    }

    /// Caller hook for archive deletion: when the deleted entry backs the
    /// active conversation, that conversation is reset to the durable
    /// instruction.
    pub fn archive_entry_deleted(&mut self, id: &str) {
        if self.active_archive_id.as_deref() != Some(id) {
            return;
        }
        self.instruction.end_override();
        self.conversation.reset(self.instruction.durable());
        self.active_archive_id = None;
    }

    /// Update the durable instruction; the leading system entry is
    /// rewritten unless an override is shadowing it.
    pub fn set_durable_instruction(&mut self, text: &str) {
        self.instruction.set_durable(text);
        if !self.instruction.has_override() {
            self.conversation.set_system_instruction(text);
        }
    }
}

/// Run one streamed turn end to end.
///
/// The session is only borrowed between awaits, so the UI can render the
/// partially streamed conversation on every frame. Must be spawned via
/// `wasm_bindgen_futures::spawn_local` in the app.
pub async fn drive_turn(
    session: &Rc<RefCell<ChatSession>>,
    client: &dyn CompletionPort,
    text: &str,
) -> Result<()> {
    let (handle, request) = session.borrow_mut().begin_turn(text)?;

    let mut stream = match client.stream_chat(request).await {
        Ok(stream) => stream,
        Err(e) => {
            session.borrow_mut().fail_turn(handle, e.to_string());
            return Err(e);
        }
    };

    while let Some(event) = stream.next().await {
        match event {
            StreamEvent::Delta(token) => {
                session.borrow_mut().apply_delta(handle, &token);
            }
            StreamEvent::Done => break,
            StreamEvent::Error(message) => {
                let err = ChatError::Transport(message);
                session.borrow_mut().fail_turn(handle, err.to_string());
                return Err(err);
            }
        }
    }

    session.borrow_mut().complete_turn(handle);
    Ok(())
}
