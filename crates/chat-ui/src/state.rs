//! UI-level state that drives rendering.
//! Conversation messages live in the session and are rendered directly
//! each frame; this is only the view-local state (input drafts, open
//! panels, status line) updated by draining the EventBus.

use chat_types::event::SessionEvent;

/// State visible to UI panels
pub struct UiState {
    /// Input field content
    pub input_text: String,
    /// Status line text
    pub status_text: String,
    /// Dismissable error banner, set when a turn fails
    pub error: Option<String>,
    /// Whether a reply is currently being streamed
    pub busy: bool,
    /// Whether the settings panel is open
    pub show_settings: bool,
    /// Whether the history drawer is open
    pub show_history: bool,
    /// Whether the save-conversation dialog is open
    pub save_dialog_open: bool,
    /// Draft name in the save dialog
    pub save_name: String,
}

impl UiState {
    pub fn new() -> Self {
        Self {
            input_text: String::new(),
            status_text: "Ready".to_string(),
            error: None,
            busy: false,
            show_settings: false,
            show_history: false,
            save_dialog_open: false,
            save_name: String::new(),
        }
    }

    /// Process events from the EventBus and update UI state
    pub fn process_events(&mut self, events: Vec<SessionEvent>) {
        for event in events {
            match event {
                SessionEvent::TurnStart { .. } => {
                    self.busy = true;
                    self.error = None;
                    self.status_text = "Thinking...".to_string();
                }
                SessionEvent::AssistantDelta { .. } => {
                    self.status_text = "Streaming...".to_string();
                }
                SessionEvent::TurnComplete { .. } => {
                    self.busy = false;
                    self.status_text = "Ready".to_string();
                }
                SessionEvent::TurnFailed { message, .. } => {
                    self.busy = false;
                    self.status_text = "Ready".to_string();
                    self.error = Some(message);
                }
                SessionEvent::InstructionChanged { .. } => {
                    self.status_text = "System prompt updated in another tab".to_string();
                }
            }
        }
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }
}

impl Default for UiState {
    fn default() -> Self {
        Self::new()
    }
}
