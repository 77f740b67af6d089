use crate::platform::TextAction;
use anyhow::{anyhow, Result};
use enigo::{Direction, Enigo, Key, Keyboard, Settings};
use std::thread;
use std::time::Duration;

const MODIFIERS: [Key; 4] = [Key::Control, Key::Alt, Key::Shift, Key::Meta];

/// Keystroke injection for macOS and Linux.
///
/// A fresh `Enigo` is opened per call so the handle never crosses threads.
pub struct EnigoTextInserter;

impl EnigoTextInserter {
    pub fn new() -> Self {
        Self
    }

    fn open(&self) -> Result<Enigo> {
        Enigo::new(&Settings::default()).map_err(|e| anyhow!("Failed to open input device: {}", e))
    }

    fn paste_modifier() -> Key {
        if cfg!(target_os = "macos") {
            Key::Meta
        } else {
            Key::Control
        }
    }
}

impl TextAction for EnigoTextInserter {
    fn type_text(&self, text: &str, interval: Duration) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }

        let mut enigo = self.open()?;

        if interval.is_zero() {
            return enigo
                .text(text)
                .map_err(|e| anyhow!("Failed to type text: {}", e));
        }

        let mut buf = [0u8; 4];
        for ch in text.chars() {
            enigo
                .text(ch.encode_utf8(&mut buf))
                .map_err(|e| anyhow!("Failed to type character: {}", e))?;
            thread::sleep(interval);
        }
        Ok(())
    }

    fn paste(&self) -> Result<()> {
        let mut enigo = self.open()?;
        let modifier = Self::paste_modifier();

        enigo
            .key(modifier, Direction::Press)
            .map_err(|e| anyhow!("Failed to press paste modifier: {}", e))?;
        let clicked = enigo.key(Key::Unicode('v'), Direction::Click);
        // Always let go of the modifier, even if the click failed
        let released = enigo.key(modifier, Direction::Release);

        clicked.map_err(|e| anyhow!("Failed to press V: {}", e))?;
        released.map_err(|e| anyhow!("Failed to release paste modifier: {}", e))?;
        Ok(())
    }

    fn release_modifiers(&self) -> Result<()> {
        let mut enigo = self.open()?;
        for key in MODIFIERS {
            if let Err(e) = enigo.key(key, Direction::Release) {
                tracing::debug!("Release of {:?} ignored: {}", key, e);
            }
        }
        Ok(())
    }
}
