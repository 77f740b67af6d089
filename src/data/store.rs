//! Encrypted Store
//!
//! Persists the slot document as `nonce || AES-256-GCM(json)` under a key
//! derived from the machine identity, so the file only opens on the host
//! that wrote it.

use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM, NONCE_LEN};
use ring::pbkdf2;
use ring::rand::{SecureRandom, SystemRandom};
use std::fs;
use std::io::{ErrorKind, Write};
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};

use crate::data::document::Document;
use crate::error::PersistenceError;

const KEY_SALT: &[u8] = b"slot-relay.store.v1";
const KEY_ITERATIONS: NonZeroU32 = match NonZeroU32::new(100_000) {
    Some(n) => n,
    None => panic!("iteration count must be non-zero"),
};
const KEY_LEN: usize = 32;

/// File-backed document store bound to one machine identity.
pub struct EncryptedStore {
    path: PathBuf,
    key: LessSafeKey,
    rng: SystemRandom,
}

impl EncryptedStore {
    /// Open the store at `path`, deriving its key from `machine_id`.
    pub fn new(path: impl Into<PathBuf>, machine_id: &str) -> Result<Self, PersistenceError> {
        let mut key_bytes = [0u8; KEY_LEN];
        pbkdf2::derive(
            pbkdf2::PBKDF2_HMAC_SHA256,
            KEY_ITERATIONS,
            KEY_SALT,
            machine_id.as_bytes(),
            &mut key_bytes,
        );
        let unbound = UnboundKey::new(&AES_256_GCM, &key_bytes)
            .map_err(|_| PersistenceError::Crypto("invalid AES-256-GCM key".into()))?;

        Ok(Self {
            path: path.into(),
            key: LessSafeKey::new(unbound),
            rng: SystemRandom::new(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the document. Absent, foreign or corrupt files yield an empty one.
    pub fn load(&self) -> Document {
        match self.try_load() {
            Ok(doc) => doc,
            Err(e) => {
                tracing::error!("Failed to load store {}: {}", self.path.display(), e);
                Document::default()
            }
        }
    }

    /// Persist the whole document. Failures are logged; memory stays authoritative.
    pub fn save(&self, doc: &Document) {
        if let Err(e) = self.try_save(doc) {
            tracing::error!("Failed to save store {}: {}", self.path.display(), e);
        }
    }

    /// Remove the backing file. Missing files count as success.
    pub fn delete(&self) {
        match fs::remove_file(&self.path) {
            Ok(()) => tracing::info!("Store file removed"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => tracing::error!("Failed to remove store {}: {}", self.path.display(), e),
        }
    }

    fn try_load(&self) -> Result<Document, PersistenceError> {
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Document::default()),
            Err(e) => return Err(e.into()),
        };
        let plaintext = self.decrypt(data)?;
        Ok(serde_json::from_slice(&plaintext)?)
    }

    fn try_save(&self, doc: &Document) -> Result<(), PersistenceError> {
        let plaintext = serde_json::to_vec(doc)?;
        let blob = self.encrypt(plaintext)?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp_path = self.path.with_extension("tmp");
        {
            let mut file = fs::File::create(&tmp_path)?;
            file.write_all(&blob)?;
            file.sync_all()?;
        }
        fs::rename(&tmp_path, &self.path)?;

        tracing::debug!("Store saved ({} slots)", doc.slots.len());
        Ok(())
    }

    fn encrypt(&self, mut in_out: Vec<u8>) -> Result<Vec<u8>, PersistenceError> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        self.rng
            .fill(&mut nonce_bytes)
            .map_err(|_| PersistenceError::Crypto("nonce generation failed".into()))?;

        self.key
            .seal_in_place_append_tag(
                Nonce::assume_unique_for_key(nonce_bytes),
                Aad::empty(),
                &mut in_out,
            )
            .map_err(|_| PersistenceError::Crypto("seal failed".into()))?;

        let mut blob = Vec::with_capacity(NONCE_LEN + in_out.len());
        blob.extend_from_slice(&nonce_bytes);
        blob.extend_from_slice(&in_out);
        Ok(blob)
    }

    fn decrypt(&self, mut blob: Vec<u8>) -> Result<Vec<u8>, PersistenceError> {
        if blob.len() < NONCE_LEN + AES_256_GCM.tag_len() {
            return Err(PersistenceError::Crypto("store file is truncated".into()));
        }
        let mut in_out = blob.split_off(NONCE_LEN);
        let nonce = Nonce::try_assume_unique_for_key(&blob)
            .map_err(|_| PersistenceError::Crypto("bad nonce".into()))?;

        let plaintext_len = self
            .key
            .open_in_place(nonce, Aad::empty(), &mut in_out)
            .map_err(|_| PersistenceError::Crypto("wrong key or tampered file".into()))?
            .len();
        in_out.truncate(plaintext_len);
        Ok(in_out)
    }
}
