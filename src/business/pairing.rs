//! Pairing Session Manager
//!
//! At most one pairing session is armed at a time. A session is a random key
//! plus a target slot; the first submission carrying the key consumes it.
//! The key travels inside a URL on the local network and is the whole trust
//! model, so it must never be reused.

use rand::Rng;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::data::SlotTarget;
use crate::error::{PairingError, SlotError};

const SESSION_KEY_LEN: usize = 6;
const SESSION_KEY_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// The one live pairing capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairingSession {
    pub key: String,
    pub target: SlotTarget,
}

/// Receiver of accepted submissions.
pub trait DeliverySink: Send + Sync {
    fn deliver(&self, target: &SlotTarget, content: String);
}

pub struct PairingManager {
    session: Mutex<Option<PairingSession>>,
    sink: Arc<dyn DeliverySink>,
}

impl PairingManager {
    pub fn new(sink: Arc<dyn DeliverySink>) -> Self {
        Self {
            session: Mutex::new(None),
            sink,
        }
    }

    fn session(&self) -> MutexGuard<'_, Option<PairingSession>> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Arm a fresh session for `target_id`, discarding any previous one.
    ///
    /// Targets a delivery could never land in are refused up front and leave
    /// the current session alone.
    pub fn begin(&self, target_id: &str) -> Result<PairingSession, SlotError> {
        let session = PairingSession {
            key: generate_session_key(),
            target: SlotTarget::parse(target_id)?,
        };

        let replaced = self.session().replace(session.clone()).is_some();
        tracing::info!(
            "Pairing armed for {}{}",
            session.target.id(),
            if replaced { " (previous session discarded)" } else { "" }
        );
        Ok(session)
    }

    /// Disarm unconditionally
    pub fn cancel(&self) {
        if self.session().take().is_some() {
            tracing::info!("Pairing cancelled");
        }
    }

    pub fn is_armed(&self) -> bool {
        self.session().is_some()
    }

    /// Accept `content` if `key` matches the armed session, consuming it.
    ///
    /// A wrong key leaves the session armed so the rightful client can retry.
    pub fn submit(&self, key: &str, content: &str) -> Result<SlotTarget, PairingError> {
        let target = {
            let mut guard = self.session();
            let session = guard.as_ref().ok_or(PairingError::NoSession)?;
            if session.key != key {
                tracing::warn!("Pairing submission with wrong key rejected");
                return Err(PairingError::KeyMismatch);
            }
            if content.is_empty() {
                return Err(PairingError::EmptyContent);
            }
            guard.take().map(|s| s.target).ok_or(PairingError::NoSession)?
        };

        tracing::info!(
            "Pairing submission accepted for {} ({} chars)",
            target.id(),
            content.chars().count()
        );
        self.sink.deliver(&target, content.to_string());
        Ok(target)
    }
}

fn generate_session_key() -> String {
    let mut rng = rand::thread_rng();
    (0..SESSION_KEY_LEN)
        .map(|_| SESSION_KEY_CHARSET[rng.gen_range(0..SESSION_KEY_CHARSET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<(SlotTarget, String)>>);

    impl DeliverySink for Recorder {
        fn deliver(&self, target: &SlotTarget, content: String) {
            self.0.lock().unwrap().push((target.clone(), content));
        }
    }

    fn manager() -> (Arc<Recorder>, PairingManager) {
        let recorder = Arc::new(Recorder::default());
        let manager = PairingManager::new(recorder.clone());
        (recorder, manager)
    }

    #[test]
    fn session_keys_are_six_uppercase_alphanumerics() {
        let key = generate_session_key();
        assert_eq!(key.len(), 6);
        assert!(key
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit()));
    }

    #[test]
    fn submit_without_session_is_unauthorized() {
        let (_, manager) = manager();
        assert_eq!(manager.submit("ABC123", "x"), Err(PairingError::NoSession));
    }

    #[test]
    fn wrong_key_keeps_session_armed() {
        let (recorder, manager) = manager();
        let session = manager.begin("row1").unwrap();

        assert_eq!(
            manager.submit("WRONG0", "x"),
            Err(PairingError::KeyMismatch)
        );
        assert!(manager.is_armed());

        assert_eq!(
            manager.submit(&session.key, "hello"),
            Ok(SlotTarget::Slot("row1".into()))
        );
        assert_eq!(
            *recorder.0.lock().unwrap(),
            vec![(SlotTarget::Slot("row1".into()), "hello".to_string())]
        );
    }

    #[test]
    fn session_is_single_use() {
        let (recorder, manager) = manager();
        let session = manager.begin("row1").unwrap();

        manager.submit(&session.key, "hello").unwrap();

        assert_eq!(
            manager.submit(&session.key, "again"),
            Err(PairingError::NoSession)
        );
        assert_eq!(recorder.0.lock().unwrap().len(), 1);
    }

    #[test]
    fn empty_content_is_rejected_without_consuming() {
        let (_, manager) = manager();
        let session = manager.begin("CLIPBOARD").unwrap();

        assert_eq!(
            manager.submit(&session.key, ""),
            Err(PairingError::EmptyContent)
        );
        assert_eq!(
            manager.submit(&session.key, "text"),
            Ok(SlotTarget::Clipboard)
        );
    }

    #[test]
    fn newer_session_replaces_older() {
        let (_, manager) = manager();
        let first = manager.begin("a").unwrap();
        let second = manager.begin("b").unwrap();

        // Keys can collide by chance; only the stale key path matters here
        if first.key != second.key {
            assert_eq!(
                manager.submit(&first.key, "x"),
                Err(PairingError::KeyMismatch)
            );
        }
        assert_eq!(
            manager.submit(&second.key, "x"),
            Ok(SlotTarget::Slot("b".into()))
        );
    }

    #[test]
    fn reserved_targets_cannot_be_armed() {
        let (recorder, manager) = manager();
        let armed = manager.begin("row1").unwrap();

        assert!(matches!(
            manager.begin("__SETTINGS__"),
            Err(SlotError::ReservedId(_))
        ));
        assert_eq!(manager.begin(""), Err(SlotError::EmptyId));

        assert_eq!(
            manager.submit(&armed.key, "kept"),
            Ok(SlotTarget::Slot("row1".into()))
        );
        assert_eq!(recorder.0.lock().unwrap().len(), 1);
    }

    #[test]
    fn cancel_disarms() {
        let (_, manager) = manager();
        let session = manager.begin("row1").unwrap();

        manager.cancel();
        manager.cancel();

        assert!(!manager.is_armed());
        assert_eq!(
            manager.submit(&session.key, "x"),
            Err(PairingError::NoSession)
        );
    }

    #[test]
    fn concurrent_submissions_have_one_winner() {
        let (recorder, manager) = manager();
        let manager = Arc::new(manager);
        let key = manager.begin("row1").unwrap().key;

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let manager = manager.clone();
                let key = key.clone();
                thread::spawn(move || manager.submit(&key, &format!("c{}", i)).is_ok())
            })
            .collect();
        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();

        assert_eq!(winners, 1);
        assert_eq!(recorder.0.lock().unwrap().len(), 1);
    }
}
