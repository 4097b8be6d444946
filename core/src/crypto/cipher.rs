// ## 📂 File: `src/crypto/cipher.rs`

//! crypto/cipher.rs
//! AES-256-CBC + HMAC-SHA256 (encrypt-then-MAC) over whole buffers.
//!
//! Blob layout:
//! ```text
//! [ iv: 16 ][ ciphertext: n * 16 (PKCS#7) ][ tag: 32 = HMAC(mac_key, iv || ciphertext) ]
//! ```
//! On disk the blob is base64 (standard alphabet) text.
//!
//! Invariants:
//! - Fresh OS-random IV on every `encrypt`; equal plaintexts give unequal blobs.
//! - `decrypt` checks length, then tag (constant time), then padding. Any corrupted
//!   byte yields `CryptoError::Decryption`; wrong plaintext is never returned.

use std::fs;
use std::path::Path;

use aes::Aes256;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use cbc::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use hmac::{Hmac, Mac};
use rand::{rngs::OsRng, RngCore};
use sha2::Sha256;

use crate::crypto::kdf::CipherKeys;
use crate::crypto::types::{CryptoError, BLOCK_LEN, IV_LEN, MIN_BLOB_LEN, TAG_LEN};

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;
type HmacSha256 = Hmac<Sha256>;

/// Symmetric cipher for generated artifacts. Keys are derived once and held by value.
#[derive(Debug, Clone)]
pub struct FileCipher {
    keys: CipherKeys,
}

impl FileCipher {
    pub fn new(keys: CipherKeys) -> Self {
        Self { keys }
    }

    /// PBKDF2 + HKDF derivation; see `crypto::kdf`.
    pub fn from_secret(secret: &str, salt: &[u8], iterations: u32) -> Result<Self, CryptoError> {
        Ok(Self::new(CipherKeys::from_secret(secret, salt, iterations)?))
    }

    fn mac(&self) -> Result<HmacSha256, CryptoError> {
        <HmacSha256 as Mac>::new_from_slice(&self.keys.mac_key)
            .map_err(|e| CryptoError::Encryption(format!("hmac init: {}", e)))
    }

    /// Encrypt a buffer into a raw blob.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let mut iv = [0u8; IV_LEN];
        OsRng.fill_bytes(&mut iv);

        let ciphertext = Aes256CbcEnc::new_from_slices(&self.keys.enc_key, &iv)
            .map_err(|e| CryptoError::Encryption(format!("cipher init: {}", e)))?
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext);

        let mut mac = self.mac()?;
        mac.update(&iv);
        mac.update(&ciphertext);
        let tag = mac.finalize().into_bytes();

        let mut blob = Vec::with_capacity(IV_LEN + ciphertext.len() + TAG_LEN);
        blob.extend_from_slice(&iv);
        blob.extend_from_slice(&ciphertext);
        blob.extend_from_slice(&tag);
        Ok(blob)
    }

    /// Authenticate and decrypt a raw blob.
    pub fn decrypt(&self, blob: &[u8]) -> Result<Vec<u8>, CryptoError> {
        if blob.len() < MIN_BLOB_LEN {
            return Err(CryptoError::Decryption(format!(
                "blob too short: {} < {}",
                blob.len(),
                MIN_BLOB_LEN
            )));
        }
        let (body, tag) = blob.split_at(blob.len() - TAG_LEN);
        let (iv, ciphertext) = body.split_at(IV_LEN);
        if ciphertext.len() % BLOCK_LEN != 0 {
            return Err(CryptoError::Decryption("ciphertext is not block aligned".into()));
        }

        let mut mac = self
            .mac()
            .map_err(|e| CryptoError::Decryption(e.to_string()))?;
        mac.update(iv);
        mac.update(ciphertext);
        mac.verify_slice(tag)
            .map_err(|_| CryptoError::Decryption("authentication tag mismatch".into()))?;

        Aes256CbcDec::new_from_slices(&self.keys.enc_key, iv)
            .map_err(|e| CryptoError::Decryption(format!("cipher init: {}", e)))?
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
            .map_err(|_| CryptoError::Decryption("invalid padding".into()))
    }

    /// Encrypt and base64-encode (the at-rest text form).
    pub fn encrypt_to_text(&self, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        Ok(STANDARD.encode(self.encrypt(plaintext)?).into_bytes())
    }

    /// Inverse of `encrypt_to_text`. Surrounding ASCII whitespace is ignored.
    pub fn decrypt_text(&self, text: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let blob = STANDARD
            .decode(text.trim_ascii())
            .map_err(|e| CryptoError::Decryption(format!("invalid base64: {}", e)))?;
        self.decrypt(&blob)
    }

    /// Read `input` whole, write its at-rest encrypted form to `output`.
    /// Replacement of an existing `output` is not atomic.
    pub fn encrypt_file(&self, input: &Path, output: &Path) -> Result<(), CryptoError> {
        let plaintext = fs::read(input)?;
        fs::write(output, self.encrypt_to_text(&plaintext)?)?;
        Ok(())
    }

    /// Read an at-rest encrypted file whole and write the plaintext to `output`.
    /// Nothing is written when authentication fails.
    pub fn decrypt_file(&self, input: &Path, output: &Path) -> Result<(), CryptoError> {
        let text = fs::read(input)?;
        let plaintext = self.decrypt_text(&text)?;
        fs::write(output, plaintext)?;
        Ok(())
    }
}
