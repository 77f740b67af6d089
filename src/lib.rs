//! Slot Relay - phone to desktop text slots
//!
//! Keeps named text slots in an encrypted per-machine store, types or pastes
//! them into the focused window on a global shortcut, and lets a phone on the
//! same network fill a slot (or the clipboard) through a one-time pairing URL.

pub mod business;
pub mod data;
pub mod error;
pub mod platform;
pub mod ui;

pub use business::{DesktopApi, PairingManager, PlatformParts, SlotRegistry, TextInserter};
pub use data::{AppConfig, EncryptedStore};
pub use error::{AutomationError, PairingError, PersistenceError, SlotError};
