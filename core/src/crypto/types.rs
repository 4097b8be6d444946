// ## 📂 File: `src/crypto/types.rs`

use std::io;

use thiserror::Error;

pub use crate::constants::{BLOCK_LEN, IV_LEN, KEY_LEN_32, TAG_LEN};

/// Smallest well-formed blob: IV, one padded block, tag.
pub const MIN_BLOB_LEN: usize = IV_LEN + BLOCK_LEN + TAG_LEN;

#[derive(Debug, Error)]
pub enum CryptoError {
    /// PBKDF2/HKDF input rejected (empty secret, zero iterations, expand failure).
    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    /// Key material of the wrong size handed to a primitive.
    #[error("invalid key length: expected={expected}, actual={actual}")]
    InvalidKeyLen { expected: usize, actual: usize },

    #[error("encryption failed: {0}")]
    Encryption(String),

    /// Short or misaligned blob, tag mismatch, bad padding or bad base64.
    /// Never carries partial plaintext.
    #[error("decryption failed: {0}")]
    Decryption(String),

    #[error("cipher I/O error: {0}")]
    Io(#[from] io::Error),
}
