#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use sheetxml_core::constants::{IV_LEN, TAG_LEN};
    use sheetxml_core::crypto::{CryptoError, FileCipher};

    fn cipher() -> FileCipher {
        FileCipher::from_secret("cipher-test-secret", b"converter_x_fixed_salt", 1_000).unwrap()
    }

    #[test]
    fn test_empty_payload_round_trip() {
        let c = cipher();
        let blob = c.encrypt(b"").unwrap();
        assert_eq!(c.decrypt(&blob).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_4096_byte_payload_round_trip() {
        let c = cipher();
        let payload: Vec<u8> = (0..4096u32).map(|i| (i % 251) as u8).collect();
        let blob = c.encrypt(&payload).unwrap();
        assert_eq!(c.decrypt(&blob).unwrap(), payload);
    }

    #[test]
    fn test_flipping_any_byte_fails_decryption() {
        let c = cipher();
        let blob = c.encrypt(b"<Row><Name>Jo</Name></Row>").unwrap();
        for i in 0..blob.len() {
            let mut tampered = blob.clone();
            tampered[i] ^= 0x01;
            match c.decrypt(&tampered) {
                Err(CryptoError::Decryption(_)) => {}
                other => panic!("byte {} flipped but got {:?}", i, other.map(|v| v.len())),
            }
        }
    }

    #[test]
    fn test_truncated_blobs_fail() {
        let c = cipher();
        let blob = c.encrypt(b"payload").unwrap();
        for len in [0, IV_LEN, IV_LEN + TAG_LEN, blob.len() - 1] {
            assert!(matches!(c.decrypt(&blob[..len]), Err(CryptoError::Decryption(_))), "len {}", len);
        }
    }

    #[test]
    fn test_same_plaintext_encrypts_differently() {
        let c = cipher();
        let a = c.encrypt(b"same").unwrap();
        let b = c.encrypt(b"same").unwrap();
        assert_ne!(a, b);
        assert_ne!(a[..IV_LEN], b[..IV_LEN]);
    }

    #[test]
    fn test_file_variants_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let plain = dir.path().join("doc.xml");
        let enc = dir.path().join("doc.xml.enc");
        let back = dir.path().join("doc.out.xml");
        std::fs::write(&plain, b"<a>1</a>\n").unwrap();

        let c = cipher();
        c.encrypt_file(&plain, &enc).unwrap();
        let at_rest = std::fs::read_to_string(&enc).unwrap();
        assert!(!at_rest.contains("<a>"));

        c.decrypt_file(&enc, &back).unwrap();
        assert_eq!(std::fs::read(&back).unwrap(), b"<a>1</a>\n");
    }

    #[test]
    fn test_failed_file_decryption_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let enc = dir.path().join("bad.xml.enc");
        let out = dir.path().join("bad.xml");
        std::fs::write(&enc, b"AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA").unwrap();
        assert!(matches!(cipher().decrypt_file(&enc, &out), Err(CryptoError::Decryption(_))));
        assert!(!out.exists());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_round_trip_any_bytes(payload in proptest::collection::vec(any::<u8>(), 0..2048)) {
            let c = cipher();
            let blob = c.encrypt(&payload).unwrap();
            prop_assert_eq!(c.decrypt(&blob).unwrap(), payload.clone());
            let text = c.encrypt_to_text(&payload).unwrap();
            prop_assert_eq!(c.decrypt_text(&text).unwrap(), payload);
        }
    }
}
