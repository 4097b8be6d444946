// ## src/crypto/kdf.rs

//! crypto/kdf.rs
//! Secret -> master key -> per-purpose subkeys.
//!
//! Design:
//! - PBKDF2-HMAC-SHA256(secret, salt, iterations) -> 32-byte master key
//! - HKDF-Expand(master, label) -> encryption key, MAC key
//!
//! Notes:
//! - The salt is deployment-wide so every process derives the same keys and
//!   artifacts written by one instance decrypt on another.
//! - Derivation is slow on purpose; do it once per process, not per request.

use std::fmt;

use hkdf::Hkdf;
use sha2::Sha256;

use crate::constants::kdf_labels;
use crate::crypto::types::{CryptoError, KEY_LEN_32};

/// Summary: PBKDF2-HMAC-SHA256 over the configured secret.
///
/// Errors:
/// - empty secret or zero iterations -> `CryptoError::KeyDerivation`.
pub fn derive_master_key(secret: &str, salt: &[u8], iterations: u32) -> Result<[u8; KEY_LEN_32], CryptoError> {
    if secret.is_empty() {
        return Err(CryptoError::KeyDerivation("secret must not be empty".into()));
    }
    if iterations == 0 {
        return Err(CryptoError::KeyDerivation("iteration count must be positive".into()));
    }
    let mut master = [0u8; KEY_LEN_32];
    pbkdf2::pbkdf2_hmac::<Sha256>(secret.as_bytes(), salt, iterations, &mut master);
    Ok(master)
}

#[inline]
fn expand_32(hk: &Hkdf<Sha256>, label: &[u8]) -> Result<[u8; KEY_LEN_32], CryptoError> {
    let mut key = [0u8; KEY_LEN_32];
    hk.expand(label, &mut key)
        .map_err(|_| CryptoError::KeyDerivation("HKDF expand failed (SHA-256)".into()))?;
    Ok(key)
}

/// Independent subkeys for the encrypt-then-MAC construction.
#[derive(Clone, PartialEq, Eq)]
pub struct CipherKeys {
    pub enc_key: [u8; KEY_LEN_32],
    pub mac_key: [u8; KEY_LEN_32],
}

impl CipherKeys {
    /// Summary: split a master key with HKDF-SHA256 (no salt; the master is already uniform).
    pub fn from_master(master: &[u8]) -> Result<Self, CryptoError> {
        if master.len() != KEY_LEN_32 {
            return Err(CryptoError::InvalidKeyLen { expected: KEY_LEN_32, actual: master.len() });
        }
        let hk = Hkdf::<Sha256>::from_prk(master)
            .map_err(|_| CryptoError::KeyDerivation("master key rejected as HKDF PRK".into()))?;
        Ok(Self {
            enc_key: expand_32(&hk, kdf_labels::ENCRYPTION)?,
            mac_key: expand_32(&hk, kdf_labels::AUTHENTICATION)?,
        })
    }

    pub fn from_secret(secret: &str, salt: &[u8], iterations: u32) -> Result<Self, CryptoError> {
        let master = derive_master_key(secret, salt, iterations)?;
        Self::from_master(&master)
    }
}

impl fmt::Debug for CipherKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CipherKeys").field("enc_key", &"<redacted>").field("mac_key", &"<redacted>").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_inputs_same_keys() {
        let a = CipherKeys::from_secret("s3cret", b"salt", 1_000).unwrap();
        let b = CipherKeys::from_secret("s3cret", b"salt", 1_000).unwrap();
        assert_eq!(a, b);
        assert_ne!(a.enc_key, a.mac_key);
    }

    #[test]
    fn salt_and_iterations_change_the_key() {
        let base = derive_master_key("s3cret", b"salt", 1_000).unwrap();
        assert_ne!(base, derive_master_key("s3cret", b"other", 1_000).unwrap());
        assert_ne!(base, derive_master_key("s3cret", b"salt", 1_001).unwrap());
    }

    #[test]
    fn empty_secret_and_zero_iterations_rejected() {
        assert!(matches!(derive_master_key("", b"salt", 10), Err(CryptoError::KeyDerivation(_))));
        assert!(matches!(derive_master_key("x", b"salt", 0), Err(CryptoError::KeyDerivation(_))));
    }

    #[test]
    fn short_master_rejected() {
        assert!(matches!(
            CipherKeys::from_master(&[1u8; 16]),
            Err(CryptoError::InvalidKeyLen { expected: 32, actual: 16 })
        ));
    }

    #[test]
    fn debug_output_hides_key_bytes() {
        let keys = CipherKeys::from_secret("s3cret", b"salt", 10).unwrap();
        let rendered = format!("{:?}", keys);
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains("enc_key: ["));
    }
}
