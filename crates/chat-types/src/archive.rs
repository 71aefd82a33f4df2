use serde::{Deserialize, Serialize};
use crate::message::Message;

/// A saved conversation snapshot, persisted as part of the archive list.
///
/// Older records were written without `captured_system_instruction` or
/// `auto_saved`; both decode with defaults so legacy archives keep loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchivedConversation {
    pub id: String,
    pub name: String,
    pub messages: Vec<Message>,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captured_system_instruction: Option<String>,
    #[serde(default)]
    pub auto_saved: bool,
}

impl ArchivedConversation {
    pub fn new(id: String, name: String, messages: Vec<Message>) -> Self {
        Self {
            id,
            name,
            messages,
            created_at: chrono::Utc::now().to_rfc3339(),
            captured_system_instruction: None,
            auto_saved: false,
        }
    }
}

/// Downloadable snapshot of a conversation. The leading system entry is
/// always excluded before construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedConversation {
    pub name: String,
    pub date: String,
    pub messages: Vec<Message>,
}
