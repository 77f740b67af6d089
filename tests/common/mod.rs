//! In-memory stand-ins for the keyboard, clipboard and hotkey hook

#![allow(dead_code)]

use anyhow::Result;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use slot_relay::data::{AutomationConfig, EncryptedStore};
use slot_relay::platform::{ClipboardAccess, HotkeyBackend, HotkeyCallback, TextAction};
use slot_relay::{DesktopApi, PlatformParts};

#[derive(Default)]
pub struct Desk {
    pub clipboard: Option<String>,
    pub typed: Vec<String>,
    pub pasted: Vec<String>,
    pub bound: BTreeMap<String, HotkeyCallback>,
}

#[derive(Clone, Default)]
pub struct FakeDesk(pub Arc<Mutex<Desk>>);

impl FakeDesk {
    pub fn with_clipboard(text: &str) -> Self {
        let desk = Self::default();
        desk.0.lock().unwrap().clipboard = Some(text.to_string());
        desk
    }

    pub fn parts(&self) -> PlatformParts {
        PlatformParts {
            keys: Box::new(self.clone()),
            clipboard: Box::new(self.clone()),
            hotkeys: Box::new(self.clone()),
        }
    }

    pub fn is_bound(&self, combo: &str) -> bool {
        self.0.lock().unwrap().bound.contains_key(combo)
    }

    /// Fire a bound shortcut the way the OS hook would
    pub fn press(&self, combo: &str) -> bool {
        let callback = self.0.lock().unwrap().bound.get(combo).cloned();
        match callback {
            Some(callback) => {
                callback();
                true
            }
            None => false,
        }
    }

    pub fn clipboard(&self) -> Option<String> {
        self.0.lock().unwrap().clipboard.clone()
    }

    pub fn typed(&self) -> Vec<String> {
        self.0.lock().unwrap().typed.clone()
    }

    pub fn pasted(&self) -> Vec<String> {
        self.0.lock().unwrap().pasted.clone()
    }
}

impl TextAction for FakeDesk {
    fn type_text(&self, text: &str, _interval: Duration) -> Result<()> {
        self.0.lock().unwrap().typed.push(text.to_string());
        Ok(())
    }

    fn paste(&self) -> Result<()> {
        let mut desk = self.0.lock().unwrap();
        let current = desk.clipboard.clone().unwrap_or_default();
        desk.pasted.push(current);
        Ok(())
    }

    fn release_modifiers(&self) -> Result<()> {
        Ok(())
    }
}

impl ClipboardAccess for FakeDesk {
    fn get_text(&self) -> Result<Option<String>> {
        Ok(self.clipboard())
    }

    fn set_text(&self, text: &str) -> Result<()> {
        self.0.lock().unwrap().clipboard = Some(text.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.0.lock().unwrap().clipboard = None;
        Ok(())
    }
}

impl HotkeyBackend for FakeDesk {
    fn register(&self, combo: &str, callback: HotkeyCallback) -> Result<()> {
        self.0
            .lock()
            .unwrap()
            .bound
            .insert(combo.to_string(), callback);
        Ok(())
    }

    fn unregister_all(&self) -> Result<()> {
        self.0.lock().unwrap().bound.clear();
        Ok(())
    }
}

pub fn start_api(dir: &tempfile::TempDir, desk: &FakeDesk, mobile_port: u16) -> DesktopApi {
    let store = EncryptedStore::new(dir.path().join("slots.dat"), "test-host").unwrap();
    DesktopApi::start(
        store,
        desk.parts(),
        AutomationConfig::immediate(),
        mobile_port,
    )
    .unwrap()
}

/// Poll `condition` until it holds or two seconds pass
pub fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(10));
    }
    condition()
}

/// Session key embedded in a pairing URL
pub fn key_from_url(url: &str) -> String {
    url.rsplit("key=").next().unwrap().to_string()
}
