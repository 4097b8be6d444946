// ## 📂 File: `src/pipeline/request.rs`

use serde::Serialize;
use serde_json::Value;

use crate::constants::SYSTEM_USER;
use crate::headers::{decode_header_fields, HeaderFieldSet};
use crate::pipeline::job::{ArtifactRef, JobId};
use crate::telemetry::ConversionSnapshot;
use crate::types::ConvertError;

/// Uploaded spreadsheet as received from the caller.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Vec<u8>,
    /// Audit identity; `system` when the request is unauthenticated.
    pub user_id: String,
}

impl Upload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self { file_name: file_name.into(), bytes, user_id: SYSTEM_USER.to_string() }
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Per-request conversion options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConversionRequest {
    pub header_fields: HeaderFieldSet,
    pub sheet_name: Option<String>,
    /// `None` defers to the pipeline's `encrypt_by_default`.
    pub encrypt_output: Option<bool>,
}

impl ConversionRequest {
    pub fn with_header_fields(mut self, fields: HeaderFieldSet) -> Self {
        self.header_fields = fields;
        self
    }

    pub fn with_sheet(mut self, sheet: impl Into<String>) -> Self {
        self.sheet_name = Some(sheet.into());
        self
    }

    pub fn with_encryption(mut self, encrypt: bool) -> Self {
        self.encrypt_output = Some(encrypt);
        self
    }

    /// Parse the `request_data` form field. Blank input means defaults.
    pub fn from_json(json: &str) -> Result<Self, ConvertError> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        let value: Value = serde_json::from_str(json).map_err(|e| ConvertError::InvalidRequest(e.to_string()))?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> Result<Self, ConvertError> {
        let obj = match value {
            Value::Null => return Ok(Self::default()),
            Value::Object(obj) => obj,
            _ => return Err(ConvertError::InvalidRequest("request data must be a JSON object".into())),
        };

        let header_fields = match obj.get("header_fields") {
            Some(v) => decode_header_fields(v)?,
            None => HeaderFieldSet::default(),
        };

        let sheet_name = match obj.get("sheet_name") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) if s.trim().is_empty() => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => return Err(ConvertError::InvalidRequest("sheet_name must be a string".into())),
        };

        let encrypt_output = match obj.get("encrypt_output") {
            None | Some(Value::Null) => None,
            Some(Value::Bool(b)) => Some(*b),
            Some(_) => return Err(ConvertError::InvalidRequest("encrypt_output must be a boolean".into())),
        };

        Ok(Self { header_fields, sheet_name, encrypt_output })
    }
}

/// Successful conversion.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionOutcome {
    pub job_id: JobId,
    pub reference: ArtifactRef,
    pub encrypted: bool,
    pub rows: usize,
    pub columns: usize,
    pub header_fields: usize,
    /// BLAKE3 of the plaintext XML.
    pub digest: String,
    pub snapshot: ConversionSnapshot,
}

/// Pre-flight check result; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub message: String,
    pub file_size: u64,
    pub file_type: String,
}

/// Plaintext artifact ready to hand to the caller.
#[derive(Debug, Clone)]
pub struct DownloadedArtifact {
    pub job_id: JobId,
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_request_is_default() {
        assert_eq!(ConversionRequest::from_json("  ").unwrap(), ConversionRequest::default());
        assert_eq!(ConversionRequest::from_json("null").unwrap(), ConversionRequest::default());
    }

    #[test]
    fn full_request_parses() {
        let req = ConversionRequest::from_json(
            r#"{"header_fields":[{"name":"Region","value":"North West"}],"sheet_name":"Q1","encrypt_output":false}"#,
        )
        .unwrap();
        assert_eq!(req.header_fields.len(), 1);
        assert_eq!(req.sheet_name.as_deref(), Some("Q1"));
        assert_eq!(req.encrypt_output, Some(false));
    }

    #[test]
    fn wrong_types_are_invalid_requests() {
        for bad in [r#"[1,2]"#, r#"{"encrypt_output":"yes"}"#, r#"{"sheet_name":3}"#, "{oops"] {
            assert!(matches!(ConversionRequest::from_json(bad), Err(ConvertError::InvalidRequest(_))), "{}", bad);
        }
    }
}
