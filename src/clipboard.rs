//! Clipboard copy with user feedback

use thiserror::Error;

use crate::notify::Toasts;

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("clipboard unavailable: {0}")]
    Unavailable(String),

    #[error("clipboard write failed: {0}")]
    Write(String),
}

pub trait ClipboardSink {
    fn set_text(&mut self, text: String) -> Result<(), ClipboardError>;
}

/// System clipboard, opened on first use
#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ClipboardSink for SystemClipboard {
    fn set_text(&mut self, text: String) -> Result<(), ClipboardError> {
        if self.inner.is_none() {
            let clipboard =
                arboard::Clipboard::new().map_err(|e| ClipboardError::Unavailable(e.to_string()))?;
            self.inner = Some(clipboard);
        }

        match self.inner.as_mut() {
            Some(clipboard) => clipboard
                .set_text(text)
                .map_err(|e| ClipboardError::Write(e.to_string())),
            None => Err(ClipboardError::Unavailable("not initialised".to_string())),
        }
    }
}

/// Copy `text` and report the outcome as a toast. Returns whether it worked.
pub fn copy_to_clipboard(sink: &mut dyn ClipboardSink, text: &str, toasts: &mut Toasts) -> bool {
    match sink.set_text(text.to_string()) {
        Ok(()) => {
            toasts.success("Copied to clipboard!");
            true
        }
        Err(e) => {
            tracing::warn!("Copy failed: {}", e);
            toasts.error("Failed to copy");
            false
        }
    }
}
