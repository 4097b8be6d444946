// ## 📂 File: `src/pipeline/mod.rs`

//! pipeline/mod.rs
//! Orchestrates one conversion or download end to end.
//!
//! Design notes:
//! - Built once per process from a `ConverterConfig`; keys are derived here and
//!   nowhere else. Shared read-only behind `Arc` by concurrent requests.
//! - Stages return `Result<_, ConvertError>`. The orchestrator maps the first
//!   error to a `Failure` exactly once, logs it, audits it, and cleans up.
//! - Synchronous; async callers run it on a blocking pool.

pub mod job;
pub mod state;
pub mod request;
mod convert;
mod download;
mod validate;

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::audit::{AuditEvent, AuditEventType, AuditSink};
use crate::config::ConverterConfig;
use crate::crypto::FileCipher;
use crate::storage::ArtifactStore;
use crate::telemetry::Stage;
use crate::types::{ConvertError, ErrorKind};

pub use job::{ArtifactRef, JobId};
pub use request::{ConversionOutcome, ConversionRequest, DownloadedArtifact, Upload, ValidationReport};
pub use state::{Failure, StageError, StageTracker};

pub struct ConversionPipeline {
    config: ConverterConfig,
    cipher: FileCipher,
    store: ArtifactStore,
    audit: Arc<dyn AuditSink>,
}

impl ConversionPipeline {
    /// Validate config, derive keys, create directories.
    pub fn new(config: ConverterConfig, audit: Arc<dyn AuditSink>) -> Result<Self, ConvertError> {
        config.validate()?;
        let cipher = FileCipher::from_secret(&config.encryption_secret, config.kdf_salt.as_bytes(), config.kdf_iterations)?;
        let store = ArtifactStore::new(&config.output_dir, &config.upload_dir);
        store.bootstrap()?;
        info!(
            output_dir = %config.output_dir.display(),
            encrypt_by_default = config.encrypt_by_default,
            strict = config.strict,
            schema_profile = config.schema_profile.is_some(),
            "conversion pipeline ready"
        );
        Ok(Self { config, cipher, store, audit })
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    pub fn cipher(&self) -> &FileCipher {
        &self.cipher
    }

    pub fn audit(&self) -> &Arc<dyn AuditSink> {
        &self.audit
    }

    /// Turn a stage error into the caller-facing `Failure`, log and audit it.
    fn fail(&self, job_id: Option<&JobId>, user_id: &str, action: &str, err: StageError) -> Failure {
        let StageError { stage, error: cause } = err;
        let kind = cause.kind();
        let detail = cause.to_string();
        let message = if self.config.expose_error_details { detail.clone() } else { cause.public_message() };
        let job = job_id.map(|j| j.to_string()).unwrap_or_default();

        match kind {
            ErrorKind::Internal | ErrorKind::EncryptionFailed | ErrorKind::DecryptionFailed => {
                error!(job_id = %job, %stage, error_code = kind.code(), error = %detail, "{} failed", action)
            }
            _ => warn!(job_id = %job, %stage, error_code = kind.code(), error = %detail, "{} rejected", action),
        }

        let mut event = AuditEvent::error(user_id, action, kind.code(), &detail)
            .with_detail("job_id", job)
            .with_detail("stage", stage.to_string());
        // A stored artifact that fails authentication has been tampered with.
        if kind == ErrorKind::DecryptionFailed {
            event.event_type = AuditEventType::Security;
        }
        self.audit.log(event);

        Failure { job_id: job_id.cloned(), stage, kind, message, detail }
    }

    fn should_encrypt(&self, request: &ConversionRequest) -> bool {
        request.encrypt_output.unwrap_or(self.config.encrypt_by_default)
    }

    fn encryption_stage(encrypt: bool) -> Stage {
        if encrypt { Stage::Encrypted } else { Stage::Plain }
    }
}
