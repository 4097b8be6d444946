// ## 📂 File: `src/constants.rs`

//! constants.rs
//! Fixed document shape, cipher sizes, and service defaults.
//!
//! The XML element names below are part of the output contract: downstream
//! consumers parse by these names, so they never come from configuration.

/// Root element of every generated document.
pub const ROOT_TAG: &str = "ExcelConverter";
/// Section holding caller-supplied header fields (present iff fields supplied).
pub const HEADER_TAG: &str = "Header";
/// Section holding one record element per source row.
pub const DATA_TAG: &str = "Data";
/// Record element, one per source row.
pub const RECORD_TAG: &str = "Row";
/// Fallback element name for column names that sanitize to nothing.
pub const FALLBACK_TAG: &str = "EMPTY_TAG";

/// Default namespace written on the root element.
pub const XML_NAMESPACE: &str = "http://www.example.com/xml/converter";
/// Document schema version, written as a root attribute and reported by `/health`.
pub const XML_SCHEMA_VERSION: &str = "1.0";
/// Indentation unit for pretty serialization.
pub const XML_INDENT_WIDTH: usize = 2;

/// AES block and IV length (bytes).
pub const BLOCK_LEN: usize = 16;
pub const IV_LEN: usize = 16;
/// Derived key length (AES-256 / HMAC-SHA256 keys).
pub const KEY_LEN_32: usize = 32;
/// HMAC-SHA256 tag appended to every encrypted blob.
pub const TAG_LEN: usize = 32;

/// PBKDF2 defaults used when configuration leaves them unset.
pub const DEFAULT_KDF_SALT: &str = "converter_x_fixed_salt";
pub const DEFAULT_KDF_ITERATIONS: u32 = 100_000;

/// HKDF info labels splitting the master key into independent subkeys.
pub mod kdf_labels {
    pub const ENCRYPTION: &[u8] = b"sheetxml|artifact|aes-256-cbc";
    pub const AUTHENTICATION: &[u8] = b"sheetxml|artifact|hmac-sha256";
}

/// Upload limits.
pub const DEFAULT_MAX_UPLOAD_SIZE_MB: u64 = 10;
pub const DEFAULT_MAX_UPLOAD_SIZE_BYTES: u64 = DEFAULT_MAX_UPLOAD_SIZE_MB * 1024 * 1024;
pub const DEFAULT_ALLOWED_EXTENSIONS: &[&str] = &[".xls", ".xlsx"];

/// API prefix used to build caller-facing download paths.
pub const API_V1_PREFIX: &str = "/api/v1";

/// On-disk artifact suffixes.
pub mod suffixes {
    pub const PLAIN: &str = ".xml";
    pub const ENCRYPTED: &str = ".xml.enc";
    pub const PARTIAL: &str = ".part";
    pub const CLAIMED: &str = ".claimed";
    pub const INPUT: &str = "_input";
}

/// Job id length in random bytes (hex-encoded to twice this many chars).
pub const JOB_ID_BYTES: usize = 16;

/// Audit identity used when a request carries no authenticated subject.
pub const SYSTEM_USER: &str = "system";
