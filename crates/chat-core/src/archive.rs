//! Named conversation snapshots persisted through the store port.
//!
//! The archive is stored as one JSON array under a single key; every
//! mutation is a whole-list read-modify-write. With multiple tabs writing
//! concurrently that pattern can lose an update — accepted risk for a
//! single-user local store, since localStorage offers no compare-and-swap.

use std::rc::Rc;

use chat_types::archive::{ArchivedConversation, ExportedConversation};
use chat_types::message::Message;
use chat_types::{ChatError, Result};

use crate::ports::StorePort;

/// Store key holding the archived conversation list.
pub const ARCHIVE_KEY: &str = "chat.conversations";

pub struct ConversationArchive {
    store: Rc<dyn StorePort>,
}

impl ConversationArchive {
    pub fn new(store: Rc<dyn StorePort>) -> Self {
        Self { store }
    }

    /// All archived conversations, in persisted insertion order.
    /// A corrupted stored list is logged and treated as empty.
    pub fn list(&self) -> Vec<ArchivedConversation> {
        let raw = match self.store.get(ARCHIVE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                log::warn!("archive read failed: {}", e);
                return Vec::new();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!(
                    "{}",
                    ChatError::PersistenceDecode(e.to_string())
                );
                Vec::new()
            }
        }
    }

    /// Snapshot the given messages under `name` and append to the
    /// persisted list. The active conversation is not touched.
    pub fn save(
        &self,
        messages: &[Message],
        name: &str,
        captured_instruction: Option<String>,
    ) -> Result<ArchivedConversation> {
        if name.trim().is_empty() {
            return Err(ChatError::Validation(
                "conversation name cannot be empty".to_string(),
            ));
        }

        let mut entries = self.list();
        let id = fresh_id(&entries);
        let mut entry =
            ArchivedConversation::new(id, name.trim().to_string(), messages.to_vec());
        entry.captured_system_instruction = captured_instruction;
        entries.push(entry.clone());
        self.write(&entries)?;
        log::info!("archived conversation {:?} ({} messages)", entry.name, entry.messages.len());
        Ok(entry)
    }

    /// Remove the entry with this id and rewrite the list. Unknown ids
    /// are a no-op.
    pub fn delete(&self, id: &str) -> Result<()> {
        let mut entries = self.list();
        let before = entries.len();
        entries.retain(|entry| entry.id != id);
        if entries.len() != before {
            self.write(&entries)?;
        }
        Ok(())
    }

    fn write(&self, entries: &[ArchivedConversation]) -> Result<()> {
        let json = serde_json::to_string(entries)?;
        self.store.set(ARCHIVE_KEY, &json)
    }
}

/// Millisecond-timestamp id; a uuid suffix is appended if two saves land
/// on the same millisecond.
fn fresh_id(existing: &[ArchivedConversation]) -> String {
    let id = chrono::Utc::now().timestamp_millis().to_string();
    if existing.iter().all(|entry| entry.id != id) {
        return id;
    }
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("{}-{}", id, &suffix[..8])
}

/// Serializable snapshot of a conversation, system entry excluded.
/// Pure transformation; nothing is persisted.
pub fn export_as_document(name: &str, messages: &[Message]) -> ExportedConversation {
    ExportedConversation {
        name: name.to_string(),
        date: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        messages: messages
            .iter()
            .filter(|m| !m.is_system())
            .cloned()
            .collect(),
    }
}
