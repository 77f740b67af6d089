//! Text Inserter
//!
//! Puts text into the currently focused window, either by typing it key by
//! key or by pasting it through the clipboard and then restoring whatever the
//! clipboard held before.

use std::thread;

use crate::business::AutomationJob;
use crate::data::AutomationConfig;
use crate::error::AutomationError;
use crate::platform::{ClipboardAccess, TextAction};

/// Text inserter service using platform-specific implementation
pub struct TextInserter {
    keys: Box<dyn TextAction>,
    clipboard: Box<dyn ClipboardAccess>,
    timing: AutomationConfig,
}

impl TextInserter {
    pub fn new(
        keys: Box<dyn TextAction>,
        clipboard: Box<dyn ClipboardAccess>,
        timing: AutomationConfig,
    ) -> Self {
        Self {
            keys,
            clipboard,
            timing,
        }
    }

    /// Insert a job's text into the focused window
    pub fn insert(&self, job: &AutomationJob) -> Result<(), AutomationError> {
        if job.is_password {
            self.type_text(&job.text)
        } else {
            self.paste_preserving_clipboard(&job.text)
        }
    }

    /// Type text directly at the configured per-character rate
    pub fn type_text(&self, text: &str) -> Result<(), AutomationError> {
        self.keys
            .type_text(text, self.timing.type_interval())
            .map_err(|e| AutomationError::Keyboard(e.to_string()))
    }

    /// Paste through the clipboard, then put the previous contents back
    pub fn paste_preserving_clipboard(&self, text: &str) -> Result<(), AutomationError> {
        let snapshot = self
            .clipboard
            .get_text()
            .map_err(|e| AutomationError::Clipboard(e.to_string()))?;

        self.clipboard
            .set_text(text)
            .map_err(|e| AutomationError::Clipboard(e.to_string()))?;

        let pasted = self
            .keys
            .paste()
            .map_err(|e| AutomationError::Keyboard(e.to_string()));
        thread::sleep(self.timing.paste_wait());

        let restored = match snapshot {
            Some(previous) => self.clipboard.set_text(&previous),
            None => self.clipboard.clear(),
        }
        .map_err(|e| AutomationError::Clipboard(e.to_string()));

        pasted.and(restored)
    }

    /// Leave text on the clipboard for the user to paste
    pub fn copy_to_clipboard(&self, text: &str) -> Result<(), AutomationError> {
        self.clipboard
            .set_text(text)
            .map_err(|e| AutomationError::Clipboard(e.to_string()))
    }

    pub fn release_modifiers(&self) -> Result<(), AutomationError> {
        self.keys
            .release_modifiers()
            .map_err(|e| AutomationError::Keyboard(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{anyhow, Result};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    #[derive(Default)]
    struct Desk {
        clipboard: Option<String>,
        pasted: Vec<String>,
        typed: Vec<String>,
        fail_paste: bool,
    }

    struct Keys(Arc<Mutex<Desk>>);
    struct Clip(Arc<Mutex<Desk>>);

    impl TextAction for Keys {
        fn type_text(&self, text: &str, _interval: Duration) -> Result<()> {
            self.0.lock().unwrap().typed.push(text.to_string());
            Ok(())
        }

        fn paste(&self) -> Result<()> {
            let mut desk = self.0.lock().unwrap();
            if desk.fail_paste {
                return Err(anyhow!("no focus"));
            }
            let current = desk.clipboard.clone().unwrap_or_default();
            desk.pasted.push(current);
            Ok(())
        }

        fn release_modifiers(&self) -> Result<()> {
            Ok(())
        }
    }

    impl ClipboardAccess for Clip {
        fn get_text(&self) -> Result<Option<String>> {
            Ok(self.0.lock().unwrap().clipboard.clone())
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

    fn inserter(desk: &Arc<Mutex<Desk>>) -> TextInserter {
        TextInserter::new(
            Box::new(Keys(desk.clone())),
            Box::new(Clip(desk.clone())),
            AutomationConfig::immediate(),
        )
    }

    #[test]
    fn plain_text_pastes_and_restores_clipboard() {
        let desk = Arc::new(Mutex::new(Desk {
            clipboard: Some("user copy".into()),
            ..Desk::default()
        }));

        inserter(&desk)
            .insert(&AutomationJob {
                text: "hello".into(),
                is_password: false,
            })
            .unwrap();

        let desk = desk.lock().unwrap();
        assert_eq!(desk.pasted, vec!["hello".to_string()]);
        assert_eq!(desk.clipboard.as_deref(), Some("user copy"));
        assert!(desk.typed.is_empty());
    }

    #[test]
    fn empty_clipboard_is_cleared_again() {
        let desk = Arc::new(Mutex::new(Desk::default()));

        inserter(&desk)
            .paste_preserving_clipboard("hello")
            .unwrap();

        assert_eq!(desk.lock().unwrap().clipboard, None);
    }

    #[test]
    fn password_is_typed_not_pasted() {
        let desk = Arc::new(Mutex::new(Desk {
            clipboard: Some("untouched".into()),
            ..Desk::default()
        }));

        inserter(&desk)
            .insert(&AutomationJob {
                text: "secret".into(),
                is_password: true,
            })
            .unwrap();

        let desk = desk.lock().unwrap();
        assert_eq!(desk.typed, vec!["secret".to_string()]);
        assert!(desk.pasted.is_empty());
        assert_eq!(desk.clipboard.as_deref(), Some("untouched"));
    }

    #[test]
    fn failed_paste_still_restores_clipboard() {
        let desk = Arc::new(Mutex::new(Desk {
            clipboard: Some("keep me".into()),
            fail_paste: true,
            ..Desk::default()
        }));

        let result = inserter(&desk).paste_preserving_clipboard("hello");

        assert!(matches!(result, Err(AutomationError::Keyboard(_))));
        assert_eq!(desk.lock().unwrap().clipboard.as_deref(), Some("keep me"));
    }
}
