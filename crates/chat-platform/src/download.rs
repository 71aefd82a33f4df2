//! Browser file download of an exported conversation.
//!
//! Creates a Blob object URL and clicks a temporary anchor element;
//! the URL is revoked once the click has been dispatched.

use wasm_bindgen::prelude::*;
use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, Url};

use chat_types::archive::ExportedConversation;
use chat_types::{ChatError, Result};

/// Offer `document` as a JSON file download named `filename`.
pub fn download_document(filename: &str, document: &ExportedConversation) -> Result<()> {
    let json = serde_json::to_string_pretty(document)?;
    download_json(filename, &json)
}

fn download_json(filename: &str, json: &str) -> Result<()> {
    let window = web_sys::window()
        .ok_or_else(|| ChatError::Store("no window object".to_string()))?;
    let dom = window
        .document()
        .ok_or_else(|| ChatError::Store("no document".to_string()))?;

    let parts = js_sys::Array::new();
    parts.push(&JsValue::from_str(json));
    let options = BlobPropertyBag::new();
    options.set_type("application/json");
    let blob = Blob::new_with_str_sequence_and_options(&parts, &options)
        .map_err(|e| ChatError::Store(format!("{:?}", e)))?;
    let url = Url::create_object_url_with_blob(&blob)
        .map_err(|e| ChatError::Store(format!("{:?}", e)))?;

    let anchor: HtmlAnchorElement = dom
        .create_element("a")
        .map_err(|e| ChatError::Store(format!("{:?}", e)))?
        .dyn_into()
        .map_err(|_| ChatError::Store("anchor element cast failed".to_string()))?;
    anchor.set_href(&url);
    anchor.set_download(filename);

    let body = dom
        .body()
        .ok_or_else(|| ChatError::Store("no document body".to_string()))?;
    body.append_child(&anchor)
        .map_err(|e| ChatError::Store(format!("{:?}", e)))?;
    anchor.click();
    let _ = body.remove_child(&anchor);
    let _ = Url::revoke_object_url(&url);

    Ok(())
}
