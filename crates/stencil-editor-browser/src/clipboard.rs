//! Browser clipboard implementation.
//!
//! Implements `ClipboardPlatform` using the async Clipboard API. The write
//! is fire-and-forget: the promise settles after the call returns, so a
//! rejection (no permission, unfocused page) is only logged.

use stencil_editor_core::{ClipboardPlatform, PlatformError};

/// Clipboard access through `navigator.clipboard`.
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserClipboard;

impl BrowserClipboard {
    pub fn new() -> Self {
        Self
    }
}

impl ClipboardPlatform for BrowserClipboard {
    fn set_clipboard_text(&self, text: &str) -> Result<(), PlatformError> {
        let window = web_sys::window().ok_or("no window")?;
        let promise = window.navigator().clipboard().write_text(text);
        let len = text.len();
        wasm_bindgen_futures::spawn_local(async move {
            match wasm_bindgen_futures::JsFuture::from(promise).await {
                Ok(_) => tracing::debug!(target: "stencil::browser", len, "wrote raw text to clipboard"),
                Err(e) => tracing::warn!(target: "stencil::browser", "clipboard write rejected: {:?}", e),
            }
        });
        Ok(())
    }
}

/// Write text and wait for the browser to accept it.
pub async fn write_text(text: &str) -> Result<(), PlatformError> {
    let window = web_sys::window().ok_or("no window")?;
    wasm_bindgen_futures::JsFuture::from(window.navigator().clipboard().write_text(text))
        .await
        .map_err(|e| format!("clipboard write rejected: {:?}", e))?;
    Ok(())
}
