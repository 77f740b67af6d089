//! Slot document
//!
//! The persisted shape: every slot keyed by id, plus an optional settings
//! record kept apart from the slot namespace.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::SlotError;

/// Pairing target meaning "the system clipboard", never a stored slot.
pub const CLIPBOARD_TARGET: &str = "CLIPBOARD";

/// Legacy settings key, rejected as a slot id so it can never shadow settings.
pub const SETTINGS_ID: &str = "__SETTINGS__";

/// A named piece of text, optionally bound to a global shortcut.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub is_password: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shortcut: Option<String>,
}

impl Slot {
    /// Shortcut with surrounding whitespace removed, `None` when blank.
    pub fn bound_shortcut(&self) -> Option<&str> {
        self.shortcut
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pin_hash: Option<String>,
}

/// Full store document. Always saved whole.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub slots: BTreeMap<String, Slot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<Settings>,
}

impl Document {
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty() && self.settings.is_none()
    }

    pub fn pin_hash(&self) -> Option<&str> {
        self.settings.as_ref().and_then(|s| s.pin_hash.as_deref())
    }
}

/// Where a pairing submission lands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotTarget {
    Clipboard,
    Slot(String),
}

impl SlotTarget {
    /// `CLIPBOARD` or any id a slot may be stored under
    pub fn parse(id: &str) -> Result<Self, SlotError> {
        if id == CLIPBOARD_TARGET {
            return Ok(SlotTarget::Clipboard);
        }
        validate_slot_id(id)?;
        Ok(SlotTarget::Slot(id.to_string()))
    }

    pub fn id(&self) -> &str {
        match self {
            SlotTarget::Clipboard => CLIPBOARD_TARGET,
            SlotTarget::Slot(id) => id,
        }
    }
}

/// Reject ids that collide with reserved names.
pub fn validate_slot_id(id: &str) -> Result<(), SlotError> {
    if id.trim().is_empty() {
        return Err(SlotError::EmptyId);
    }
    if id == CLIPBOARD_TARGET || id == SETTINGS_ID {
        return Err(SlotError::ReservedId(id.to_string()));
    }
    Ok(())
}
