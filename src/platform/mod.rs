use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;

mod clipboard;
mod hotkey;

#[cfg(not(target_os = "windows"))]
mod enigo_input;
#[cfg(target_os = "windows")]
pub mod windows;

pub use clipboard::ArboardClipboard;
pub use hotkey::{parse_combo_key, GlobalHotkeyBackend};

/// Callback fired by the OS hotkey hook. Must do no more than enqueue work.
pub type HotkeyCallback = Arc<dyn Fn() + Send + Sync + 'static>;

/// Trait for platform-specific keystroke injection
pub trait TextAction: Send + Sync {
    /// Type text into the focused window as synthetic keystrokes,
    /// waiting `interval` after each character
    fn type_text(&self, text: &str, interval: Duration) -> Result<()>;
    /// Press the platform paste shortcut (Cmd+V on macOS, Ctrl+V elsewhere)
    fn paste(&self) -> Result<()>;
    /// Release every modifier key that may still be logically held
    fn release_modifiers(&self) -> Result<()>;
}

/// Trait for system clipboard access
pub trait ClipboardAccess: Send + Sync {
    /// Current text contents, `None` when empty or not text
    fn get_text(&self) -> Result<Option<String>>;
    fn set_text(&self, text: &str) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

/// Trait for global shortcut registration
pub trait HotkeyBackend: Send + Sync {
    /// Bind `combo` to `callback`. Re-binding an already bound combo replaces
    /// its callback.
    fn register(&self, combo: &str, callback: HotkeyCallback) -> Result<()>;
    /// Drop every binding made through this backend
    fn unregister_all(&self) -> Result<()>;
}

/// Factory for creating platform-specific implementations
pub struct PlatformFactory;

impl PlatformFactory {
    pub fn create_text_action() -> Box<dyn TextAction> {
        #[cfg(target_os = "windows")]
        return Box::new(windows::WindowsTextInserter::new());
        #[cfg(not(target_os = "windows"))]
        return Box::new(enigo_input::EnigoTextInserter::new());
    }

    pub fn create_clipboard() -> Result<Box<dyn ClipboardAccess>> {
        Ok(Box::new(ArboardClipboard::new()?))
    }

    pub fn create_hotkey_backend() -> Result<Box<dyn HotkeyBackend>> {
        Ok(Box::new(GlobalHotkeyBackend::new()?))
    }
}
