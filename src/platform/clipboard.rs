//! System clipboard through `arboard`.
//!
//! One `Clipboard` handle lives for the whole process: on X11 the contents we
//! set are owned by that handle and vanish when it is dropped.

use anyhow::{anyhow, Result};
use arboard::Clipboard;
use std::sync::Mutex;

use crate::platform::ClipboardAccess;

pub struct ArboardClipboard {
    inner: Mutex<Clipboard>,
}

impl ArboardClipboard {
    pub fn new() -> Result<Self> {
        let clipboard =
            Clipboard::new().map_err(|e| anyhow!("Failed to open clipboard: {}", e))?;
        Ok(Self {
            inner: Mutex::new(clipboard),
        })
    }

    fn with<T>(&self, f: impl FnOnce(&mut Clipboard) -> Result<T>) -> Result<T> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| anyhow!("Clipboard lock poisoned"))?;
        f(&mut guard)
    }
}

impl ClipboardAccess for ArboardClipboard {
    fn get_text(&self) -> Result<Option<String>> {
        self.with(|cb| match cb.get_text() {
            Ok(text) => Ok(Some(text)),
            Err(arboard::Error::ContentNotAvailable) => Ok(None),
            Err(e) => Err(anyhow!("Failed to read clipboard: {}", e)),
        })
    }

    fn set_text(&self, text: &str) -> Result<()> {
        self.with(|cb| {
            cb.set_text(text.to_string())
                .map_err(|e| anyhow!("Failed to write clipboard: {}", e))
        })
    }

    fn clear(&self) -> Result<()> {
        self.with(|cb| {
            cb.clear()
                .map_err(|e| anyhow!("Failed to clear clipboard: {}", e))
        })
    }
}
