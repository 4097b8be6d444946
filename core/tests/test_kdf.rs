#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use sheetxml_core::constants::{DEFAULT_KDF_SALT, KEY_LEN_32};
    use sheetxml_core::crypto::{derive_master_key, CipherKeys, CryptoError, FileCipher};

    #[test]
    fn test_master_key_is_32_bytes_and_deterministic() {
        let k1 = derive_master_key("secret", DEFAULT_KDF_SALT.as_bytes(), 1_000).unwrap();
        let k2 = derive_master_key("secret", DEFAULT_KDF_SALT.as_bytes(), 1_000).unwrap();
        assert_eq!(k1.len(), KEY_LEN_32);
        assert_eq!(k1, k2);
    }

    #[test]
    fn test_different_secrets_give_different_keys() {
        let a = CipherKeys::from_secret("secret-a", b"salt", 1_000).unwrap();
        let b = CipherKeys::from_secret("secret-b", b"salt", 1_000).unwrap();
        assert_ne!(a.enc_key, b.enc_key);
        assert_ne!(a.mac_key, b.mac_key);
    }

    #[test]
    fn test_two_processes_with_same_config_share_artifacts() {
        // Fixed salt: independently constructed ciphers interoperate.
        let writer = FileCipher::from_secret("shared", DEFAULT_KDF_SALT.as_bytes(), 1_000).unwrap();
        let reader = FileCipher::from_secret("shared", DEFAULT_KDF_SALT.as_bytes(), 1_000).unwrap();
        let blob = writer.encrypt(b"<ExcelConverter/>").unwrap();
        assert_eq!(reader.decrypt(&blob).unwrap(), b"<ExcelConverter/>");
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        assert!(matches!(FileCipher::from_secret("", b"salt", 10), Err(CryptoError::KeyDerivation(_))));
        assert!(matches!(FileCipher::from_secret("x", b"salt", 0), Err(CryptoError::KeyDerivation(_))));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_subkeys_are_deterministic_and_distinct(master in any::<[u8; 32]>()) {
            let k1 = CipherKeys::from_master(&master).unwrap();
            let k2 = CipherKeys::from_master(&master).unwrap();
            prop_assert_eq!(&k1, &k2);
            prop_assert_ne!(k1.enc_key, k1.mac_key);
        }
    }
}
