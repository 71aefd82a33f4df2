use serde::{Deserialize, Serialize};

/// Events emitted by the chat session.
/// UI subscribes to these for reactive updates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SessionEvent {
    /// A user turn started streaming
    TurnStart { turn_id: u64 },

    /// A fragment of assistant text arrived
    AssistantDelta { token: String },

    /// The assistant reply finished cleanly
    TurnComplete { turn_id: u64 },

    /// The turn failed; the placeholder reply was rolled back
    TurnFailed { turn_id: u64, message: String },

    /// The durable system instruction changed (e.g. from another tab)
    InstructionChanged { text: String },
}
