//! Global shortcuts through `global-hotkey`.
//!
//! Bindings are keyed by the hotkey id; a dispatcher thread drains
//! `GlobalHotKeyEvent::receiver()` and fires the bound callback on press.

use anyhow::{anyhow, Result};
use global_hotkey::{
    hotkey::{Code, HotKey, Modifiers},
    GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::thread;

use crate::platform::{HotkeyBackend, HotkeyCallback};

type Bindings = Arc<Mutex<HashMap<u32, (HotKey, HotkeyCallback)>>>;

pub struct GlobalHotkeyBackend {
    manager: GlobalHotKeyManager,
    bindings: Bindings,
}

impl GlobalHotkeyBackend {
    pub fn new() -> Result<Self> {
        let manager = GlobalHotKeyManager::new()
            .map_err(|e| anyhow!("Failed to create hotkey manager: {}", e))?;
        let bindings: Bindings = Arc::new(Mutex::new(HashMap::new()));

        let dispatch = bindings.clone();
        thread::Builder::new()
            .name("hotkey-dispatch".into())
            .spawn(move || {
                let receiver = GlobalHotKeyEvent::receiver();
                while let Ok(event) = receiver.recv() {
                    if matches!(event.state, HotKeyState::Released) {
                        continue;
                    }
                    let callback = dispatch
                        .lock()
                        .ok()
                        .and_then(|b| b.get(&event.id).map(|(_, cb)| cb.clone()));
                    if let Some(callback) = callback {
                        callback();
                    }
                }
                tracing::info!("Hotkey dispatcher stopped");
            })?;

        Ok(Self { manager, bindings })
    }
}

impl HotkeyBackend for GlobalHotkeyBackend {
    fn register(&self, combo: &str, callback: HotkeyCallback) -> Result<()> {
        let hotkey = parse_combo_key(combo)?;
        let mut bindings = self
            .bindings
            .lock()
            .map_err(|_| anyhow!("Hotkey bindings lock poisoned"))?;

        if let Some(entry) = bindings.get_mut(&hotkey.id()) {
            tracing::warn!("Shortcut {} bound twice, last binding wins", combo);
            entry.1 = callback;
            return Ok(());
        }

        self.manager
            .register(hotkey)
            .map_err(|e| anyhow!("Failed to register hotkey {}: {}", combo, e))?;
        bindings.insert(hotkey.id(), (hotkey, callback));
        Ok(())
    }

    fn unregister_all(&self) -> Result<()> {
        let mut bindings = self
            .bindings
            .lock()
            .map_err(|_| anyhow!("Hotkey bindings lock poisoned"))?;
        let hotkeys: Vec<HotKey> = bindings.values().map(|(hotkey, _)| *hotkey).collect();
        bindings.clear();

        if hotkeys.is_empty() {
            return Ok(());
        }
        self.manager
            .unregister_all(&hotkeys)
            .map_err(|e| anyhow!("Failed to unregister hotkeys: {}", e))
    }
}

impl Drop for GlobalHotkeyBackend {
    fn drop(&mut self) {
        if let Err(e) = self.unregister_all() {
            tracing::warn!("{}", e);
        }
    }
}

/// Parse a combo key string like "Ctrl+Shift+V" or "ctrl+alt+p"
pub fn parse_combo_key(key_str: &str) -> Result<HotKey> {
    let parts: Vec<&str> = key_str
        .split('+')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();

    let mut modifiers = Modifiers::empty();
    let mut key_code: Option<Code> = None;

    for part in parts {
        match part.to_lowercase().as_str() {
            "ctrl" | "control" => modifiers |= Modifiers::CONTROL,
            "shift" => modifiers |= Modifiers::SHIFT,
            "alt" | "option" => modifiers |= Modifiers::ALT,
            "super" | "win" | "meta" | "cmd" | "command" => modifiers |= Modifiers::SUPER,
            _ => {
                if key_code.is_some() {
                    return Err(anyhow!("More than one key in combo: {}", key_str));
                }
                key_code = Some(parse_key_code(part)?);
            }
        }
    }

    let code = key_code.ok_or_else(|| anyhow!("No key specified in combo: {}", key_str))?;

    let modifiers = (!modifiers.is_empty()).then_some(modifiers);
    Ok(HotKey::new(modifiers, code))
}

/// Parse a key code from string
fn parse_key_code(key: &str) -> Result<Code> {
    let code = match key.to_uppercase().as_str() {
        "A" => Code::KeyA,
        "B" => Code::KeyB,
        "C" => Code::KeyC,
        "D" => Code::KeyD,
        "E" => Code::KeyE,
        "F" => Code::KeyF,
        "G" => Code::KeyG,
        "H" => Code::KeyH,
        "I" => Code::KeyI,
        "J" => Code::KeyJ,
        "K" => Code::KeyK,
        "L" => Code::KeyL,
        "M" => Code::KeyM,
        "N" => Code::KeyN,
        "O" => Code::KeyO,
        "P" => Code::KeyP,
        "Q" => Code::KeyQ,
        "R" => Code::KeyR,
        "S" => Code::KeyS,
        "T" => Code::KeyT,
        "U" => Code::KeyU,
        "V" => Code::KeyV,
        "W" => Code::KeyW,
        "X" => Code::KeyX,
        "Y" => Code::KeyY,
        "Z" => Code::KeyZ,
        "0" => Code::Digit0,
        "1" => Code::Digit1,
        "2" => Code::Digit2,
        "3" => Code::Digit3,
        "4" => Code::Digit4,
        "5" => Code::Digit5,
        "6" => Code::Digit6,
        "7" => Code::Digit7,
        "8" => Code::Digit8,
        "9" => Code::Digit9,
        "SPACE" => Code::Space,
        "TAB" => Code::Tab,
        "ENTER" | "RETURN" => Code::Enter,
        "ESCAPE" | "ESC" => Code::Escape,
        "F1" => Code::F1,
        "F2" => Code::F2,
        "F3" => Code::F3,
        "F4" => Code::F4,
        "F5" => Code::F5,
        "F6" => Code::F6,
        "F7" => Code::F7,
        "F8" => Code::F8,
        "F9" => Code::F9,
        "F10" => Code::F10,
        "F11" => Code::F11,
        "F12" => Code::F12,
        _ => return Err(anyhow!("Unknown key: {}", key)),
    };

    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_lowercase_combo() {
        let hotkey = parse_combo_key("ctrl+alt+p").unwrap();
        assert_eq!(
            hotkey,
            HotKey::new(Some(Modifiers::CONTROL | Modifiers::ALT), Code::KeyP)
        );
    }

    #[test]
    fn parses_mixed_case_with_spaces() {
        let hotkey = parse_combo_key(" Ctrl + Shift + F5 ").unwrap();
        assert_eq!(
            hotkey,
            HotKey::new(Some(Modifiers::CONTROL | Modifiers::SHIFT), Code::F5)
        );
    }

    #[test]
    fn command_aliases_map_to_super() {
        assert_eq!(
            parse_combo_key("cmd+1").unwrap(),
            parse_combo_key("win+1").unwrap()
        );
    }

    #[test]
    fn rejects_combo_without_key() {
        assert!(parse_combo_key("ctrl+alt").is_err());
        assert!(parse_combo_key("").is_err());
    }

    #[test]
    fn rejects_unknown_or_duplicate_keys() {
        assert!(parse_combo_key("ctrl+banana").is_err());
        assert!(parse_combo_key("ctrl+a+b").is_err());
    }
}
