// ## 📂 File: `src/types.rs`

//! types.rs
//! Unified conversion error and its stable, caller-facing classification.
//!
//! Design notes:
//! - Every pipeline stage returns `Result<_, ConvertError>`; `From<T>` impls let `?`
//!   work across source, XML, crypto and storage layers.
//! - `ErrorKind` is the closed taxonomy surfaced to callers. Codes are stable strings.
//! - Display text may contain internal detail (paths, parser messages). Use
//!   `public_message()` for anything that leaves the process by default.

use std::fmt;
use std::io;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::crypto::CryptoError;
use crate::source::ColumnType;

#[derive(Debug, Error)]
pub enum ConvertError {
    /// Source bytes are not a readable spreadsheet (or the sheet/extension is wrong).
    #[error("invalid spreadsheet: {0}")]
    InvalidFormat(String),

    /// Spreadsheet has no data rows.
    #[error("spreadsheet contains no data rows")]
    EmptySource,

    /// Required columns of the configured schema profile are absent.
    #[error("missing required columns: {}", missing.join(", "))]
    SchemaMismatch { missing: Vec<String> },

    /// A cell cannot be coerced to its declared column type.
    #[error("column '{column}' row {row}: expected {expected}, found '{found}'")]
    TypeCoercion {
        column: String,
        row: usize,
        expected: ColumnType,
        found: String,
    },

    /// Header field name sanitizes to nothing (or is not a valid tag in strict mode).
    #[error("invalid header field name: '{name}'")]
    TagSanitization { name: String },

    /// Malformed request metadata (header-field JSON, options).
    #[error("invalid request data: {0}")]
    InvalidRequest(String),

    /// Cipher, key derivation or padding failure.
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// Download reference is unknown, malformed, or already consumed.
    #[error("artifact not found: {reference}")]
    ArtifactNotFound { reference: String },

    /// Upload exceeds the configured ceiling.
    #[error("upload of {size} bytes exceeds limit of {limit} bytes")]
    UploadTooLarge { size: u64, limit: u64 },

    /// XML writer/reader failure.
    #[error("xml error: {0}")]
    Xml(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl ConvertError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConvertError::InvalidFormat(_) => ErrorKind::InvalidFormat,
            ConvertError::EmptySource => ErrorKind::EmptySource,
            ConvertError::SchemaMismatch { .. } => ErrorKind::SchemaMismatch,
            ConvertError::TypeCoercion { .. } => ErrorKind::TypeCoercion,
            ConvertError::TagSanitization { .. } => ErrorKind::TagSanitization,
            ConvertError::InvalidRequest(_) => ErrorKind::InvalidRequest,
            ConvertError::Crypto(CryptoError::Decryption(_)) => ErrorKind::DecryptionFailed,
            ConvertError::Crypto(CryptoError::Io(_)) => ErrorKind::Internal,
            ConvertError::Crypto(_) => ErrorKind::EncryptionFailed,
            ConvertError::ArtifactNotFound { .. } => ErrorKind::ArtifactNotFound,
            ConvertError::UploadTooLarge { .. } => ErrorKind::UploadTooLarge,
            ConvertError::Xml(_) | ConvertError::Io(_) => ErrorKind::Internal,
        }
    }

    /// Message safe to return to a caller without the debug flag.
    /// Input-validation errors describe the caller's own data; everything else is generic.
    pub fn public_message(&self) -> String {
        match self {
            ConvertError::EmptySource
            | ConvertError::SchemaMismatch { .. }
            | ConvertError::TypeCoercion { .. }
            | ConvertError::TagSanitization { .. }
            | ConvertError::InvalidRequest(_)
            | ConvertError::UploadTooLarge { .. } => self.to_string(),
            _ => self.kind().default_message().to_string(),
        }
    }
}

/// Closed, caller-facing error taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    InvalidFormat,
    EmptySource,
    SchemaMismatch,
    TypeCoercion,
    TagSanitization,
    InvalidRequest,
    EncryptionFailed,
    DecryptionFailed,
    ArtifactNotFound,
    UploadTooLarge,
    Internal,
}

impl ErrorKind {
    /// Stable error code string.
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::InvalidFormat => "INVALID_FORMAT",
            ErrorKind::EmptySource => "EMPTY_SOURCE",
            ErrorKind::SchemaMismatch => "SCHEMA_MISMATCH",
            ErrorKind::TypeCoercion => "TYPE_COERCION",
            ErrorKind::TagSanitization => "TAG_SANITIZATION",
            ErrorKind::InvalidRequest => "INVALID_REQUEST",
            ErrorKind::EncryptionFailed => "ENCRYPTION_FAILED",
            ErrorKind::DecryptionFailed => "DECRYPTION_FAILED",
            ErrorKind::ArtifactNotFound => "ARTIFACT_NOT_FOUND",
            ErrorKind::UploadTooLarge => "UPLOAD_TOO_LARGE",
            ErrorKind::Internal => "INTERNAL",
        }
    }

    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorKind::InvalidFormat => "Invalid Excel file format",
            ErrorKind::EmptySource => "Excel file is empty",
            ErrorKind::SchemaMismatch => "Spreadsheet does not match the required columns",
            ErrorKind::TypeCoercion => "Spreadsheet contains values of the wrong type",
            ErrorKind::TagSanitization => "Invalid header field name",
            ErrorKind::InvalidRequest => "Invalid request data format",
            ErrorKind::EncryptionFailed => "Failed to protect the converted file",
            ErrorKind::DecryptionFailed => "Failed to read the converted file",
            ErrorKind::ArtifactNotFound => "File not found",
            ErrorKind::UploadTooLarge => "File size exceeds the upload limit",
            ErrorKind::Internal => "Internal conversion error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl From<calamine::Error> for ConvertError {
    fn from(e: calamine::Error) -> Self {
        ConvertError::InvalidFormat(e.to_string())
    }
}

impl From<quick_xml::Error> for ConvertError {
    fn from(e: quick_xml::Error) -> Self {
        ConvertError::Xml(e.to_string())
    }
}
