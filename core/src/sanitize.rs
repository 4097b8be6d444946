// ## 📂 File: `src/sanitize.rs`

//! sanitize.rs
//! Arbitrary text -> valid XML element name.
//!
//! Rules, applied in order:
//! 1. every whitespace run collapses to one `_`;
//! 2. every char outside `[A-Za-z0-9_.-]` is dropped (ASCII only);
//! 3. a non-empty result not starting with a letter or `_` gets a leading `_`;
//! 4. an empty result falls back to `EMPTY_TAG` (columns) or is rejected (header fields).
//!
//! Every output matches `^[A-Za-z_][A-Za-z0-9_.-]*$`, and sanitizing twice is a no-op.

use crate::constants::FALLBACK_TAG;
use crate::types::ConvertError;

#[inline]
fn is_tag_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-')
}

#[inline]
fn is_tag_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

/// Sanitize without fallback. `None` when nothing usable remains.
pub fn try_sanitize_tag(name: &str) -> Option<String> {
    let mut tag = String::with_capacity(name.len() + 1);
    let mut in_whitespace = false;

    for c in name.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                tag.push('_');
                in_whitespace = true;
            }
            continue;
        }
        in_whitespace = false;
        if is_tag_char(c) {
            tag.push(c);
        }
    }

    match tag.chars().next() {
        None => None,
        Some(first) if is_tag_start(first) => Some(tag),
        Some(_) => {
            tag.insert(0, '_');
            Some(tag)
        }
    }
}

/// Total sanitizer used for column names; degrades to `EMPTY_TAG`.
pub fn sanitize_tag(name: &str) -> String {
    try_sanitize_tag(name).unwrap_or_else(|| FALLBACK_TAG.to_string())
}

/// Header names are caller intent: no silent fallback.
/// In strict mode the name must already be a valid tag.
pub fn sanitize_header_name(name: &str, strict: bool) -> Result<String, ConvertError> {
    let rejected = || ConvertError::TagSanitization { name: name.to_string() };
    let tag = try_sanitize_tag(name).ok_or_else(rejected)?;
    if strict && tag != name {
        return Err(rejected());
    }
    Ok(tag)
}

/// `^[A-Za-z_][A-Za-z0-9_.-]*$`
pub fn is_valid_tag(tag: &str) -> bool {
    let mut chars = tag.chars();
    match chars.next() {
        Some(first) if is_tag_start(first) => chars.all(is_tag_char),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_runs_collapse_to_single_underscore() {
        assert_eq!(sanitize_tag("First   Name"), "First_Name");
        assert_eq!(sanitize_tag("a\t\n b"), "a_b");
    }

    #[test]
    fn leading_digit_gets_underscore_prefix() {
        assert_eq!(sanitize_tag("2024 Sales"), "_2024_Sales");
        assert_eq!(sanitize_tag("-x"), "_-x");
    }

    #[test]
    fn disallowed_characters_are_stripped() {
        assert_eq!(sanitize_tag("Unnamed: 0"), "Unnamed_0");
        assert_eq!(sanitize_tag("Amount ($)"), "Amount_");
        assert_eq!(sanitize_tag("naïve"), "nave");
    }

    #[test]
    fn all_disallowed_falls_back() {
        assert_eq!(sanitize_tag("$%^&"), FALLBACK_TAG);
        assert_eq!(sanitize_tag(""), FALLBACK_TAG);
        assert_eq!(try_sanitize_tag("()"), None);
    }

    #[test]
    fn header_names_never_fall_back() {
        let err = sanitize_header_name("***", false).unwrap_err();
        assert!(matches!(err, ConvertError::TagSanitization { ref name } if name == "***"));
        assert_eq!(sanitize_header_name("Report Date", false).unwrap(), "Report_Date");
    }

    #[test]
    fn strict_mode_rejects_names_that_change() {
        assert!(sanitize_header_name("Report Date", true).is_err());
        assert_eq!(sanitize_header_name("Report_Date", true).unwrap(), "Report_Date");
    }

    #[test]
    fn validity_check_matches_rules() {
        assert!(is_valid_tag("_a.b-c9"));
        assert!(!is_valid_tag("9a"));
        assert!(!is_valid_tag(""));
        assert!(!is_valid_tag("a b"));
    }
}
