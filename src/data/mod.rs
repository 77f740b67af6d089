//! Data module for configuration, the slot document and its encrypted store

mod config;
mod document;
mod machine_id;
mod pin;
mod store;

pub use config::{
    AppConfig, AutomationConfig, LoggingConfig, ServerConfig, DESKTOP_PORT, MOBILE_PORT,
};
pub use document::{
    validate_slot_id, Document, Settings, Slot, SlotTarget, CLIPBOARD_TARGET, SETTINGS_ID,
};
pub use machine_id::machine_id;
pub use pin::{hash_pin, is_valid_pin, verify_pin};
pub use store::EncryptedStore;
