//! Pick the best available store backend.
//!
//! localStorage first (persistent, cross-tab notification); memory as the
//! fallback so the app still runs where storage is disabled.

use std::rc::Rc;

use chat_core::ports::StorePort;

use super::{LocalStorageStore, MemoryStore};

/// Open the best available store. Returns a trait object so callers are
/// backend-agnostic.
pub fn auto_detect_store() -> Rc<dyn StorePort> {
    match LocalStorageStore::open() {
        Ok(store) => {
            log::info!("store backend: localStorage");
            Rc::new(store)
        }
        Err(e) => {
            log::warn!("localStorage unavailable ({}), falling back to memory", e);
            Rc::new(MemoryStore::new())
        }
    }
}
