// ## 📂 File: `src/pipeline/validate.rs`

use tracing::{debug, instrument};

use super::request::{Upload, ValidationReport};
use super::ConversionPipeline;
use crate::audit::{AuditEvent, AuditStatus};
use crate::source::{read_workbook, SourceInput};
use crate::types::ConvertError;
use crate::utils::file_extension;

impl ConversionPipeline {
    /// Size, extension and readability check. Nothing is written to disk.
    #[instrument(skip_all, fields(file = %upload.file_name))]
    pub fn validate(&self, upload: &Upload) -> ValidationReport {
        let outcome = self
            .check_upload(upload)
            .and_then(|_| read_workbook(SourceInput::Memory(&upload.bytes), None))
            .and_then(|source| if source.is_empty() { Err(ConvertError::EmptySource) } else { Ok(source) });

        let (is_valid, message) = match &outcome {
            Ok(_) => (true, "File is valid".to_string()),
            Err(e) if self.config.expose_error_details => (false, e.to_string()),
            Err(e) => (false, e.public_message()),
        };
        debug!(is_valid, message = %message, "validation finished");

        self.audit.log(
            AuditEvent::file_operation(&upload.user_id, "validate", &upload.file_name, upload.size())
                .with_status(AuditStatus::from_ok(is_valid)),
        );

        ValidationReport {
            is_valid,
            message,
            file_size: upload.size(),
            file_type: file_extension(&upload.file_name),
        }
    }
}
