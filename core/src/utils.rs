use std::borrow::Cow;
use std::path::Path;

/// Lower-cased extension of `file_name` including the dot (`".xlsx"`), or `""`.
pub fn file_extension(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_ascii_lowercase()))
        .unwrap_or_default()
}

/// Case-insensitive extension allow-list check.
pub fn is_allowed_extension(file_name: &str, allowed: &[String]) -> bool {
    let ext = file_extension(file_name);
    !ext.is_empty() && allowed.iter().any(|a| a.eq_ignore_ascii_case(&ext))
}

/// XML 1.0 `Char` production: tab, LF, CR and everything from U+0020 except the
/// two non-characters U+FFFE/U+FFFF. (Rust `char` already excludes surrogates.)
#[inline]
fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r') || (c >= '\u{20}' && c != '\u{FFFE}' && c != '\u{FFFF}')
}

/// Drop characters that cannot appear in XML 1.0 text. Borrows when nothing changes.
pub fn xml_safe_text(text: &str) -> Cow<'_, str> {
    if text.chars().all(is_xml_char) {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(text.chars().filter(|c| is_xml_char(*c)).collect())
    }
}

/// Human readable byte size for log lines and validation messages.
pub fn format_mb(bytes: u64) -> String {
    let mb = bytes as f64 / (1024.0 * 1024.0);
    if mb.fract() == 0.0 {
        format!("{}MB", mb as u64)
    } else {
        format!("{:.1}MB", mb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_is_lowercased_with_dot() {
        assert_eq!(file_extension("Report.XLSX"), ".xlsx");
        assert_eq!(file_extension("archive.tar.xls"), ".xls");
        assert_eq!(file_extension("noext"), "");
    }

    #[test]
    fn allow_list_ignores_case() {
        let allowed = vec![".xls".to_string(), ".xlsx".to_string()];
        assert!(is_allowed_extension("a.XlSx", &allowed));
        assert!(!is_allowed_extension("a.csv", &allowed));
        assert!(!is_allowed_extension("xlsx", &allowed));
    }

    #[test]
    fn control_characters_are_dropped() {
        assert_eq!(xml_safe_text("a\u{1}b\u{b}c"), "abc");
        assert!(matches!(xml_safe_text("tab\tok"), Cow::Borrowed(_)));
    }

    #[test]
    fn sizes_render_in_megabytes() {
        assert_eq!(format_mb(10 * 1024 * 1024), "10MB");
        assert_eq!(format_mb(1536 * 1024), "1.5MB");
    }
}
