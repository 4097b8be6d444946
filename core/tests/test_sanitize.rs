#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use sheetxml_core::constants::FALLBACK_TAG;
    use sheetxml_core::sanitize::{is_valid_tag, sanitize_header_name, sanitize_tag, try_sanitize_tag};

    #[test]
    fn test_examples() {
        assert_eq!(sanitize_tag("First Name"), "First_Name");
        assert_eq!(sanitize_tag("  padded  "), "_padded_");
        assert_eq!(sanitize_tag("1st"), "_1st");
        assert_eq!(sanitize_tag("e-mail.address"), "e-mail.address");
        assert_eq!(sanitize_tag("%%%"), FALLBACK_TAG);
    }

    #[test]
    fn test_strict_header_names() {
        assert!(sanitize_header_name("Region", true).is_ok());
        assert!(sanitize_header_name("North West", true).is_err());
        assert!(sanitize_header_name("", false).is_err());
    }

    proptest! {
        #[test]
        fn prop_output_is_always_a_valid_tag(s in ".*") {
            prop_assert!(is_valid_tag(&sanitize_tag(&s)));
        }

        #[test]
        fn prop_sanitize_is_idempotent(s in ".*") {
            let once = sanitize_tag(&s);
            prop_assert_eq!(sanitize_tag(&once), once.clone());
        }

        #[test]
        fn prop_valid_tags_are_unchanged(s in "[A-Za-z_][A-Za-z0-9_.-]{0,20}") {
            prop_assert_eq!(try_sanitize_tag(&s), Some(s.clone()));
            prop_assert_eq!(sanitize_header_name(&s, true).unwrap(), s);
        }
    }
}
