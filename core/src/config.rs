// ## 📂 File: `src/config.rs`

//! config.rs
//! Pipeline configuration, passed by value at construction. No globals.
//!
//! Every field has a serde default except the directories and secret, so an
//! adapter can deserialize a partial document and fill the rest.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_ALLOWED_EXTENSIONS, DEFAULT_KDF_ITERATIONS, DEFAULT_KDF_SALT, DEFAULT_MAX_UPLOAD_SIZE_BYTES,
};
use crate::source::SchemaProfile;
use crate::types::ConvertError;

fn default_max_upload() -> u64 {
    DEFAULT_MAX_UPLOAD_SIZE_BYTES
}

fn default_extensions() -> Vec<String> {
    DEFAULT_ALLOWED_EXTENSIONS.iter().map(|s| s.to_string()).collect()
}

fn default_salt() -> String {
    DEFAULT_KDF_SALT.to_string()
}

fn default_iterations() -> u32 {
    DEFAULT_KDF_ITERATIONS
}

fn default_true() -> bool {
    true
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConverterConfig {
    #[serde(default = "default_max_upload")]
    pub max_upload_size_bytes: u64,
    /// Lower-case, with leading dot.
    #[serde(default = "default_extensions")]
    pub allowed_extensions: Vec<String>,
    pub output_dir: PathBuf,
    pub upload_dir: PathBuf,
    #[serde(skip_serializing)]
    pub encryption_secret: String,
    #[serde(default = "default_salt")]
    pub kdf_salt: String,
    #[serde(default = "default_iterations")]
    pub kdf_iterations: u32,
    /// Used when a request does not say whether to encrypt.
    #[serde(default = "default_true")]
    pub encrypt_by_default: bool,
    /// Keep artifacts after a successful download (disables single-use).
    #[serde(default)]
    pub retain_after_download: bool,
    /// Header names must already be valid tags.
    #[serde(default)]
    pub strict: bool,
    #[serde(default)]
    pub schema_profile: Option<SchemaProfile>,
    /// Put internal error text in `Failure::message`.
    #[serde(default)]
    pub expose_error_details: bool,
}

impl ConverterConfig {
    pub fn new(output_dir: impl Into<PathBuf>, upload_dir: impl Into<PathBuf>, encryption_secret: impl Into<String>) -> Self {
        Self {
            max_upload_size_bytes: default_max_upload(),
            allowed_extensions: default_extensions(),
            output_dir: output_dir.into(),
            upload_dir: upload_dir.into(),
            encryption_secret: encryption_secret.into(),
            kdf_salt: default_salt(),
            kdf_iterations: default_iterations(),
            encrypt_by_default: true,
            retain_after_download: false,
            strict: false,
            schema_profile: None,
            expose_error_details: false,
        }
    }

    pub fn with_kdf_iterations(mut self, iterations: u32) -> Self {
        self.kdf_iterations = iterations;
        self
    }

    pub fn with_max_upload_size(mut self, bytes: u64) -> Self {
        self.max_upload_size_bytes = bytes;
        self
    }

    pub fn with_schema_profile(mut self, profile: SchemaProfile) -> Self {
        self.schema_profile = Some(profile);
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Reject configurations the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ConvertError> {
        let invalid = |msg: &str| Err(ConvertError::InvalidRequest(format!("configuration: {}", msg)));
        if self.encryption_secret.is_empty() {
            return invalid("encryption secret must be set");
        }
        if self.kdf_iterations == 0 {
            return invalid("kdf iterations must be positive");
        }
        if self.max_upload_size_bytes == 0 {
            return invalid("max upload size must be positive");
        }
        if self.allowed_extensions.is_empty() {
            return invalid("at least one file extension must be allowed");
        }
        if self.output_dir == self.upload_dir {
            return invalid("output and upload directories must differ");
        }
        Ok(())
    }
}

impl fmt::Debug for ConverterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConverterConfig")
            .field("max_upload_size_bytes", &self.max_upload_size_bytes)
            .field("allowed_extensions", &self.allowed_extensions)
            .field("output_dir", &self.output_dir)
            .field("upload_dir", &self.upload_dir)
            .field("encryption_secret", &"<redacted>")
            .field("kdf_iterations", &self.kdf_iterations)
            .field("encrypt_by_default", &self.encrypt_by_default)
            .field("retain_after_download", &self.retain_after_download)
            .field("strict", &self.strict)
            .field("schema_profile", &self.schema_profile)
            .field("expose_error_details", &self.expose_error_details)
            .finish()
    }
}
