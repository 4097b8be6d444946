// ## 📂 File: `src/pipeline/download.rs`

use std::fs;

use tracing::{info, instrument, warn};

use super::job::JobId;
use super::request::DownloadedArtifact;
use super::state::{Failure, StageError, StageTracker};
use super::ConversionPipeline;
use crate::audit::AuditEvent;
use crate::telemetry::Stage;

const ACTION: &str = "download";
const XML_CONTENT_TYPE: &str = "application/xml";

impl ConversionPipeline {
    /// Reference -> plaintext XML.
    ///
    /// Single use: the artifact is claimed before it is read and deleted after
    /// it is decrypted, so a second call with the same reference reports
    /// `ArtifactNotFound`. With `retain_after_download` the artifact is put back.
    /// If decryption fails the artifact is left in place.
    #[instrument(skip(self), fields(user = %user_id))]
    pub fn download(&self, reference: &str, user_id: &str) -> Result<DownloadedArtifact, Failure> {
        let mut tracker = StageTracker::new(Stage::Located);
        let mut job: Option<JobId> = None;

        let result = self.run_download(reference, &mut tracker, &mut job);
        match result {
            Ok(artifact) => {
                self.audit.log(
                    AuditEvent::file_operation(user_id, ACTION, &artifact.file_name, artifact.bytes.len() as u64)
                        .with_detail("job_id", artifact.job_id.to_string()),
                );
                Ok(artifact)
            }
            Err(err) => Err(self.fail(job.as_ref(), user_id, ACTION, err)),
        }
    }

    fn run_download(
        &self,
        reference: &str,
        tracker: &mut StageTracker,
        job_slot: &mut Option<JobId>,
    ) -> Result<DownloadedArtifact, StageError> {
        let (job_id, claim) = tracker.run(Stage::Located, || {
            let job_id = JobId::parse(reference)?;
            let claim = self.store.claim(&job_id)?;
            Ok((job_id, claim))
        })?;
        *job_slot = Some(job_id.clone());

        let stored = tracker.run(Stage::Located, || Ok(fs::read(claim.path())?))?;
        let bytes = if claim.encrypted() {
            tracker.run(Stage::Decrypted, || Ok(self.cipher.decrypt_text(&stored)?))?
        } else {
            stored
        };

        tracker.mark(Stage::Delivered);
        let settled = if self.config.retain_after_download { claim.release() } else { claim.consume() };
        if let Err(e) = settled {
            warn!(job_id = %job_id, error = %e, "artifact could not be settled after delivery");
        }
        info!(job_id = %job_id, bytes = bytes.len(), retained = self.config.retain_after_download, "artifact delivered");

        Ok(DownloadedArtifact {
            file_name: format!("converted_{}.xml", job_id),
            job_id,
            content_type: XML_CONTENT_TYPE,
            bytes,
        })
    }
}
