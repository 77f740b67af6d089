//! Slot Registry
//!
//! In-memory slot map backed by the encrypted store. Every mutation persists
//! the full document under the same lock before returning, and changes that
//! can affect shortcut bindings are announced through a listener.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::business::AutomationJob;
use crate::data::{
    hash_pin, is_valid_pin, validate_slot_id, verify_pin, Document, EncryptedStore, Settings, Slot,
};
use crate::error::{PersistenceError, SlotError};

pub type BindingsListener = Arc<dyn Fn() + Send + Sync + 'static>;

pub struct SlotRegistry {
    store: EncryptedStore,
    document: Mutex<Document>,
    listener: Mutex<Option<BindingsListener>>,
}

impl SlotRegistry {
    /// Create a registry holding whatever the store currently contains
    pub fn new(store: EncryptedStore) -> Self {
        let document = store.load();
        tracing::info!("Loaded {} slots from store", document.slots.len());
        Self {
            store,
            document: Mutex::new(document),
            listener: Mutex::new(None),
        }
    }

    /// Set callback for when shortcut bindings may need a rebuild
    pub fn on_bindings_changed(&self, listener: BindingsListener) {
        *self.listener.lock().unwrap_or_else(PoisonError::into_inner) = Some(listener);
    }

    fn document(&self) -> MutexGuard<'_, Document> {
        self.document.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self) {
        let listener = self
            .listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(listener) = listener {
            listener();
        }
    }

    /// Replace the slot's full record
    pub fn upsert(
        &self,
        id: &str,
        text: String,
        is_password: bool,
        shortcut: Option<String>,
    ) -> Result<(), SlotError> {
        validate_slot_id(id)?;

        let shortcut_changed = {
            let mut doc = self.document();
            let previous = doc.slots.get(id).and_then(|s| s.shortcut.clone());
            let changed = previous != shortcut;
            doc.slots.insert(
                id.to_string(),
                Slot {
                    text,
                    is_password,
                    shortcut,
                },
            );
            self.store.save(&doc);
            changed
        };

        tracing::debug!("Slot {} saved", id);
        if shortcut_changed {
            self.notify();
        }
        Ok(())
    }

    /// Overwrite only the text of a slot, creating it if missing
    pub fn set_text(&self, id: &str, text: String) -> Result<(), SlotError> {
        validate_slot_id(id)?;

        let created = {
            let mut doc = self.document();
            let created = !doc.slots.contains_key(id);
            doc.slots.entry(id.to_string()).or_default().text = text;
            self.store.save(&doc);
            created
        };

        tracing::debug!("Slot {} text updated", id);
        if created {
            self.notify();
        }
        Ok(())
    }

    /// Remove a slot. Returns whether it existed.
    pub fn delete(&self, id: &str) -> bool {
        let removed = {
            let mut doc = self.document();
            let removed = doc.slots.remove(id).is_some();
            if removed {
                self.store.save(&doc);
            }
            removed
        };

        if removed {
            tracing::debug!("Slot {} deleted", id);
            self.notify();
        }
        removed
    }

    /// Snapshot of the whole document
    pub fn get_all(&self) -> Document {
        self.document().clone()
    }

    pub fn get(&self, id: &str) -> Option<Slot> {
        self.document().slots.get(id).cloned()
    }

    /// `(slot id, shortcut)` for every slot with a non-blank shortcut
    pub fn bindings(&self) -> Vec<(String, String)> {
        self.document()
            .slots
            .iter()
            .filter_map(|(id, slot)| {
                slot.bound_shortcut()
                    .map(|combo| (id.clone(), combo.to_string()))
            })
            .collect()
    }

    /// The job a shortcut on this slot should run, if it has text
    pub fn job_for(&self, id: &str) -> Option<AutomationJob> {
        self.document()
            .slots
            .get(id)
            .filter(|slot| !slot.text.is_empty())
            .map(|slot| AutomationJob {
                text: slot.text.clone(),
                is_password: slot.is_password,
            })
    }

    /// Drop every slot and the settings, and remove the backing file
    pub fn reset(&self) {
        {
            let mut doc = self.document();
            *doc = Document::default();
            self.store.delete();
        }
        tracing::info!("All slots and settings cleared");
        self.notify();
    }

    pub fn has_pin(&self) -> bool {
        self.document().pin_hash().is_some()
    }

    pub fn set_pin(&self, pin: &str) -> Result<(), SlotError> {
        if !is_valid_pin(pin) {
            return Err(SlotError::InvalidPin);
        }
        self.store_pin_hash(hash_pin(pin))
    }

    fn store_pin_hash(&self, hashed: Result<String, PersistenceError>) -> Result<(), SlotError> {
        let hashed = hashed.map_err(|e| {
            tracing::error!("Failed to hash PIN: {}", e);
            SlotError::PinStorage(e.to_string())
        })?;

        let mut doc = self.document();
        doc.settings.get_or_insert_with(Settings::default).pin_hash = Some(hashed);
        self.store.save(&doc);
        tracing::info!("PIN updated");
        Ok(())
    }

    pub fn verify_pin(&self, pin: &str) -> bool {
        let stored = match self.document().pin_hash() {
            Some(stored) => stored.to_string(),
            None => return false,
        };
        verify_pin(pin, &stored)
    }
}
