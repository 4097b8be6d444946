// ## 📂 File: `src/crypto/digest.rs`

/// BLAKE3 fingerprint of plaintext XML, lowercase hex (64 chars).
///
/// Recorded in the conversion outcome and audit trail so a delivered file can be
/// matched to the conversion that produced it without storing the plaintext.
pub fn content_digest(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}

/// Constant-time comparison of a buffer against a recorded digest.
pub fn verify_digest(bytes: &[u8], expected_hex: &str) -> bool {
    match blake3::Hash::from_hex(expected_hex) {
        Ok(expected) => blake3::hash(bytes) == expected,
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_stable_hex() {
        let d = content_digest(b"<Data/>");
        assert_eq!(d.len(), 64);
        assert_eq!(d, content_digest(b"<Data/>"));
        assert!(verify_digest(b"<Data/>", &d));
        assert!(!verify_digest(b"<Data />", &d));
        assert!(!verify_digest(b"<Data/>", "zz"));
    }
}
