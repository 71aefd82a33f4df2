//! localStorage backend.
//! Persistent across page reloads; synchronous like the underlying API.
//! Cross-tab changes surface through the DOM `storage` event, which fires
//! in every tab except the one that wrote.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use web_sys::StorageEvent;

use chat_core::ports::StorePort;
use chat_types::{ChatError, Result};

type Subscribers = Rc<RefCell<Vec<(String, Box<dyn Fn(Option<String>)>)>>>;

pub struct LocalStorageStore {
    storage: web_sys::Storage,
    subscribers: Subscribers,
    // Kept alive for the lifetime of the adapter; the window listener
    // dispatches into `subscribers`.
    _listener: Closure<dyn FnMut(StorageEvent)>,
}

impl LocalStorageStore {
    pub fn open() -> Result<Self> {
        let window = web_sys::window()
            .ok_or_else(|| ChatError::Store("no window object".to_string()))?;
        let storage = window
            .local_storage()
            .map_err(|e| ChatError::Store(format!("{:?}", e)))?
            .ok_or_else(|| ChatError::Store("localStorage not available".to_string()))?;

        let subscribers: Subscribers = Rc::new(RefCell::new(Vec::new()));
        let dispatch = subscribers.clone();
        let listener = Closure::wrap(Box::new(move |event: StorageEvent| {
            let Some(key) = event.key() else { return };
            let value = event.new_value();
            for (watched, callback) in dispatch.borrow().iter() {
                if *watched == key {
                    callback(value.clone());
                }
            }
        }) as Box<dyn FnMut(StorageEvent)>);

        window
            .add_event_listener_with_callback("storage", listener.as_ref().unchecked_ref())
            .map_err(|e| ChatError::Store(format!("{:?}", e)))?;

        Ok(Self {
            storage,
            subscribers,
            _listener: listener,
        })
    }
}

impl StorePort for LocalStorageStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.storage
            .get_item(key)
            .map_err(|e| ChatError::Store(format!("{:?}", e)))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        // Fails when the quota is exhausted or storage is disabled.
        self.storage
            .set_item(key, value)
            .map_err(|e| ChatError::Store(format!("{:?}", e)))
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.storage
            .remove_item(key)
            .map_err(|e| ChatError::Store(format!("{:?}", e)))
    }

    fn on_external_change(&self, key: &str, callback: Box<dyn Fn(Option<String>)>) {
        self.subscribers
            .borrow_mut()
            .push((key.to_string(), callback));
    }

    fn backend_name(&self) -> &str {
        "localstorage"
    }
}
