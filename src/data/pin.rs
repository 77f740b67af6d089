//! PIN hashing
//!
//! Stored form is `hex(salt)$hex(pbkdf2(pin))`, one random salt per PIN.

use ring::pbkdf2;
use ring::rand::{SecureRandom, SystemRandom};
use std::num::NonZeroU32;

use crate::error::PersistenceError;

const PIN_ITERATIONS: NonZeroU32 = match NonZeroU32::new(100_000) {
    Some(n) => n,
    None => panic!("iteration count must be non-zero"),
};
const SALT_LEN: usize = 16;
const HASH_LEN: usize = 32;

/// Hash `pin` under a fresh random salt.
pub fn hash_pin(pin: &str) -> Result<String, PersistenceError> {
    let mut salt = [0u8; SALT_LEN];
    SystemRandom::new()
        .fill(&mut salt)
        .map_err(|_| PersistenceError::Crypto("salt generation failed".into()))?;

    let mut hash = [0u8; HASH_LEN];
    pbkdf2::derive(
        pbkdf2::PBKDF2_HMAC_SHA256,
        PIN_ITERATIONS,
        &salt,
        pin.as_bytes(),
        &mut hash,
    );
    Ok(format!("{}${}", hex::encode(salt), hex::encode(hash)))
}

/// Check `pin` against a stored hash. Malformed hashes never verify.
pub fn verify_pin(pin: &str, stored: &str) -> bool {
    let Some((salt_hex, hash_hex)) = stored.split_once('$') else {
        return false;
    };
    let (Ok(salt), Ok(hash)) = (hex::decode(salt_hex), hex::decode(hash_hex)) else {
        return false;
    };
    if hash.len() != HASH_LEN {
        return false;
    }

    pbkdf2::verify(
        pbkdf2::PBKDF2_HMAC_SHA256,
        PIN_ITERATIONS,
        &salt,
        pin.as_bytes(),
        &hash,
    )
    .is_ok()
}

/// PINs are 4 to 8 ASCII digits.
pub fn is_valid_pin(pin: &str) -> bool {
    (4..=8).contains(&pin.len()) && pin.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correct_pin_verifies() {
        let stored = hash_pin("1234").unwrap();
        assert!(verify_pin("1234", &stored));
        assert!(!verify_pin("4321", &stored));
    }

    #[test]
    fn same_pin_hashes_differently() {
        assert_ne!(hash_pin("1234").unwrap(), hash_pin("1234").unwrap());
    }

    #[test]
    fn malformed_hashes_never_verify() {
        assert!(!verify_pin("1234", ""));
        assert!(!verify_pin("1234", "nodollar"));
        assert!(!verify_pin("1234", "zz$zz"));
        assert!(!verify_pin("1234", "00$00"));
    }

    #[test]
    fn pin_format_is_short_numeric() {
        assert!(is_valid_pin("1234"));
        assert!(is_valid_pin("12345678"));
        assert!(!is_valid_pin("123"));
        assert!(!is_valid_pin("123456789"));
        assert!(!is_valid_pin("12a4"));
    }
}
