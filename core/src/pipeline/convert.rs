// ## 📂 File: `src/pipeline/convert.rs`

use tracing::{info, instrument, warn};

use super::job::{ArtifactRef, JobId};
use super::request::{ConversionOutcome, ConversionRequest, Upload};
use super::state::{Failure, StageError, StageTracker};
use super::ConversionPipeline;
use crate::audit::AuditEvent;
use crate::crypto::content_digest;
use crate::source::{read_workbook, SourceInput};
use crate::telemetry::{ConversionCounters, ConversionSnapshot, Stage};
use crate::types::ConvertError;
use crate::utils::{file_extension, format_mb, is_allowed_extension};
use crate::xml::{build_document, to_pretty_xml};

const ACTION: &str = "convert_excel_to_xml";

impl ConversionPipeline {
    /// Spreadsheet upload -> stored XML artifact.
    ///
    /// On failure nothing is left behind for the job: the uploaded input is
    /// removed on every path and any artifact already written is deleted.
    #[instrument(skip_all, fields(file = %upload.file_name, user = %upload.user_id))]
    pub fn convert(&self, upload: Upload, request: ConversionRequest) -> Result<ConversionOutcome, Failure> {
        let job_id = JobId::generate();
        let tracker = StageTracker::new(Stage::Received);

        match self.run_conversion(&job_id, &upload, &request, tracker) {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                if let Err(e) = self.store.remove_artifacts(&job_id) {
                    warn!(job_id = %job_id, error = %e, "cleanup after failed conversion incomplete");
                }
                Err(self.fail(Some(&job_id), &upload.user_id, ACTION, err))
            }
        }
    }

    pub(super) fn check_upload(&self, upload: &Upload) -> Result<String, ConvertError> {
        let limit = self.config.max_upload_size_bytes;
        if upload.size() > limit {
            return Err(ConvertError::UploadTooLarge { size: upload.size(), limit });
        }
        if !is_allowed_extension(&upload.file_name, &self.config.allowed_extensions) {
            return Err(ConvertError::InvalidFormat(format!(
                "file type '{}' not allowed; allowed types: {}",
                file_extension(&upload.file_name),
                self.config.allowed_extensions.join(", ")
            )));
        }
        Ok(file_extension(&upload.file_name))
    }

    fn run_conversion(
        &self,
        job_id: &JobId,
        upload: &Upload,
        request: &ConversionRequest,
        mut tracker: StageTracker,
    ) -> Result<ConversionOutcome, StageError> {
        let mut counters = ConversionCounters::default();

        // Received: limits, then persist the input for the lifetime of this call.
        let input = tracker.run(Stage::Received, || {
            let ext = self.check_upload(upload)?;
            self.store.write_upload(job_id, &ext, &upload.bytes)
        })?;
        counters.record_input(upload.bytes.len());
        info!(job_id = %job_id, size = %format_mb(upload.size()), "upload received");

        // Validated: readable, non-empty, matches the schema profile.
        let source = tracker.run(Stage::Validated, || {
            let source = read_workbook(SourceInput::File(input.path()), request.sheet_name.as_deref())?;
            if source.is_empty() {
                return Err(ConvertError::EmptySource);
            }
            match &self.config.schema_profile {
                Some(profile) => profile.apply(source),
                None => Ok(source),
            }
        })?;
        drop(input);
        counters.record_shape(source.row_count(), source.column_count(), request.header_fields.len());

        let tree = tracker.run(Stage::Built, || build_document(&request.header_fields, &source, self.config.strict))?;
        let xml = tracker.run(Stage::Serialized, || to_pretty_xml(&tree))?;
        drop(tree);
        counters.record_xml(xml.len());
        let digest = content_digest(&xml);

        // Plaintext stays in memory; only the final artifact reaches the output dir.
        let encrypted = self.should_encrypt(request);
        let artifact = tracker.run(Self::encryption_stage(encrypted), || {
            if encrypted {
                Ok(self.cipher.encrypt_to_text(&xml)?)
            } else {
                Ok(xml)
            }
        })?;
        counters.record_artifact(artifact.len());

        let path = tracker.run(Stage::Persisted, || self.store.write_artifact(job_id, encrypted, &artifact))?;
        tracker.mark(Stage::Completed);

        let timer = tracker.finish();
        let snapshot = ConversionSnapshot::from(&counters, &timer);
        if !snapshot.sanity_check() {
            warn!(job_id = %job_id, "stage times exceed wall time");
        }

        let output_name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        self.audit.log(
            AuditEvent::conversion(&upload.user_id, &upload.file_name, &output_name, snapshot.elapsed_ms)
                .with_detail("job_id", job_id.to_string())
                .with_detail("rows", source.row_count())
                .with_detail("columns", source.column_count())
                .with_detail("encrypted", encrypted)
                .with_detail("digest", digest.clone())
                .with_detail("snapshot", serde_json::to_value(&snapshot).unwrap_or_default()),
        );
        info!(
            job_id = %job_id,
            rows = source.row_count(),
            columns = source.column_count(),
            encrypted,
            elapsed_ms = snapshot.elapsed_ms,
            "conversion completed"
        );

        Ok(ConversionOutcome {
            job_id: job_id.clone(),
            reference: ArtifactRef::new(job_id.clone(), encrypted),
            encrypted,
            rows: source.row_count(),
            columns: source.column_count(),
            header_fields: request.header_fields.len(),
            digest,
            snapshot,
        })
    }
}
