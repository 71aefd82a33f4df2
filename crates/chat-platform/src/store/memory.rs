//! In-memory store backend.
//! Fallback for contexts without localStorage; not persistent across
//! page reloads.

use std::cell::RefCell;
use std::collections::HashMap;

use chat_core::ports::StorePort;
use chat_types::Result;

pub struct MemoryStore {
    data: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            data: RefCell::new(HashMap::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StorePort for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.data.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.data
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.data.borrow_mut().remove(key);
        Ok(())
    }

    fn on_external_change(&self, _key: &str, _callback: Box<dyn Fn(Option<String>)>) {
        // A volatile single-tab store has no external writers.
    }

    fn backend_name(&self) -> &str {
        "memory"
    }
}
