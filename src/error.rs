//! Error types
//!
//! Pairing and slot errors are surfaced to callers. Persistence and automation
//! errors are logged and swallowed at the component boundary.

use thiserror::Error;

/// Rejection of a pairing submission.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PairingError {
    #[error("no active pairing session")]
    NoSession,
    #[error("pairing key does not match the active session")]
    KeyMismatch,
    #[error("submitted content is empty")]
    EmptyContent,
}

impl PairingError {
    /// HTTP status the pairing listener answers with.
    pub fn status_code(&self) -> u16 {
        match self {
            PairingError::NoSession | PairingError::KeyMismatch => 403,
            PairingError::EmptyContent => 400,
        }
    }

    /// Authorization failures leave an armed session untouched.
    pub fn is_authorization(&self) -> bool {
        matches!(self, PairingError::NoSession | PairingError::KeyMismatch)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SlotError {
    #[error("slot id must not be empty")]
    EmptyId,
    #[error("slot id '{0}' is reserved")]
    ReservedId(String),
    #[error("PIN must be 4 to 8 digits")]
    InvalidPin,
    #[error("PIN could not be stored: {0}")]
    PinStorage(String),
}

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("store encryption failed: {0}")]
    Crypto(String),
    #[error("store document is malformed: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("no per-user data directory on this system")]
    NoDataDir,
}

#[derive(Debug, Error)]
pub enum AutomationError {
    #[error("keyboard injection failed: {0}")]
    Keyboard(String),
    #[error("clipboard access failed: {0}")]
    Clipboard(String),
}
