use crate::platform::TextAction;
use anyhow::Result;
use std::mem::size_of;
use std::thread;
use std::time::Duration;
use windows::Win32::UI::Input::KeyboardAndMouse::{
    SendInput, INPUT, INPUT_0, INPUT_KEYBOARD, KEYBDINPUT, KEYBD_EVENT_FLAGS, KEYEVENTF_KEYUP,
    KEYEVENTF_UNICODE, VIRTUAL_KEY, VK_CONTROL, VK_LWIN, VK_MENU, VK_RWIN, VK_SHIFT,
};

const VK_V: VIRTUAL_KEY = VIRTUAL_KEY(0x56);
const MODIFIERS: [VIRTUAL_KEY; 5] = [VK_CONTROL, VK_MENU, VK_SHIFT, VK_LWIN, VK_RWIN];

pub struct WindowsTextInserter;

impl WindowsTextInserter {
    pub fn new() -> Self {
        Self
    }

    /// Create a Unicode character input
    fn create_unicode_input(&self, ch: u16, key_down: bool) -> INPUT {
        INPUT {
            r#type: INPUT_KEYBOARD,
            Anonymous: INPUT_0 {
                ki: KEYBDINPUT {
                    wVk: VIRTUAL_KEY(0),
                    wScan: ch,
                    dwFlags: if key_down {
                        KEYEVENTF_UNICODE
                    } else {
                        KEYEVENTF_UNICODE | KEYEVENTF_KEYUP
                    },
                    time: 0,
                    dwExtraInfo: 0,
                },
            },
        }
    }

    /// Create a virtual key input
    fn create_key_input(&self, vk: VIRTUAL_KEY, key_down: bool) -> INPUT {
        INPUT {
            r#type: INPUT_KEYBOARD,
            Anonymous: INPUT_0 {
                ki: KEYBDINPUT {
                    wVk: vk,
                    wScan: 0,
                    dwFlags: if key_down {
                        KEYBD_EVENT_FLAGS(0)
                    } else {
                        KEYEVENTF_KEYUP
                    },
                    time: 0,
                    dwExtraInfo: 0,
                },
            },
        }
    }

    /// Send inputs using Windows SendInput API
    fn send_inputs(&self, inputs: &[INPUT]) -> Result<()> {
        if inputs.is_empty() {
            return Ok(());
        }

        let sent = unsafe { SendInput(inputs, size_of::<INPUT>() as i32) };

        if sent != inputs.len() as u32 {
            return Err(anyhow::anyhow!(
                "SendInput sent {} of {} inputs",
                sent,
                inputs.len()
            ));
        }

        Ok(())
    }
}

impl TextAction for WindowsTextInserter {
    fn type_text(&self, text: &str, interval: Duration) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }

        if interval.is_zero() {
            let inputs: Vec<INPUT> = text
                .encode_utf16()
                .flat_map(|ch| {
                    [
                        self.create_unicode_input(ch, true),
                        self.create_unicode_input(ch, false),
                    ]
                })
                .collect();
            return self.send_inputs(&inputs);
        }

        // One character per batch; surrogate pairs travel together
        let mut buf = [0u16; 2];
        for ch in text.chars() {
            let units = ch.encode_utf16(&mut buf);
            let mut inputs: Vec<INPUT> = Vec::with_capacity(units.len() * 2);
            for unit in units.iter() {
                inputs.push(self.create_unicode_input(*unit, true));
            }
            for unit in units.iter() {
                inputs.push(self.create_unicode_input(*unit, false));
            }
            self.send_inputs(&inputs)?;
            thread::sleep(interval);
        }
        Ok(())
    }

    fn paste(&self) -> Result<()> {
        let inputs = [
            self.create_key_input(VK_CONTROL, true),
            self.create_key_input(VK_V, true),
            self.create_key_input(VK_V, false),
            self.create_key_input(VK_CONTROL, false),
        ];
        self.send_inputs(&inputs)
    }

    fn release_modifiers(&self) -> Result<()> {
        let inputs: Vec<INPUT> = MODIFIERS
            .iter()
            .map(|vk| self.create_key_input(*vk, false))
            .collect();
        if let Err(e) = self.send_inputs(&inputs) {
            tracing::debug!("Modifier release partially ignored: {}", e);
        }
        Ok(())
    }
}
