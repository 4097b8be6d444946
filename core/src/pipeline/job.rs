// ## 📂 File: `src/pipeline/job.rs`

use std::fmt;
use std::str::FromStr;

use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};

use crate::constants::{API_V1_PREFIX, JOB_ID_BYTES};
use crate::types::ConvertError;

/// Opaque conversion identifier: 16 OS-random bytes as 32 lowercase hex chars.
///
/// `parse` is the only way an external reference becomes a `JobId`, so every
/// path built from one stays inside the store directories.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct JobId(String);

impl JobId {
    pub fn generate() -> Self {
        let mut raw = [0u8; JOB_ID_BYTES];
        OsRng.fill_bytes(&mut raw);
        Self(hex::encode(raw))
    }

    /// Accept exactly `2 * JOB_ID_BYTES` lowercase hex chars; anything else is
    /// reported as an unknown artifact.
    pub fn parse(reference: &str) -> Result<Self, ConvertError> {
        let well_formed = reference.len() == JOB_ID_BYTES * 2
            && reference.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'));
        if well_formed {
            Ok(Self(reference.to_string()))
        } else {
            Err(ConvertError::ArtifactNotFound { reference: reference.to_string() })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for JobId {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for JobId {
    type Error = ConvertError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<JobId> for String {
    fn from(id: JobId) -> Self {
        id.0
    }
}

/// Caller-facing handle to a stored artifact. Never carries a filesystem path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRef {
    pub job_id: JobId,
    pub download_path: String,
    pub encrypted: bool,
}

impl ArtifactRef {
    pub fn new(job_id: JobId, encrypted: bool) -> Self {
        let download_path = format!("{}/download/{}", API_V1_PREFIX, job_id);
        Self { job_id, download_path, encrypted }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_parse_back() {
        let id = JobId::generate();
        assert_eq!(id.as_str().len(), 32);
        assert_eq!(JobId::parse(id.as_str()).unwrap(), id);
        assert_ne!(JobId::generate(), id);
    }

    #[test]
    fn traversal_and_uppercase_rejected() {
        for bad in ["../../etc/passwd", "", "ABCDEF0123456789ABCDEF0123456789", "0123456789abcdef0123456789abcde"] {
            assert!(matches!(JobId::parse(bad), Err(ConvertError::ArtifactNotFound { .. })), "{}", bad);
        }
    }

    #[test]
    fn reference_carries_api_path_only() {
        let id = JobId::parse("0123456789abcdef0123456789abcdef").unwrap();
        let r = ArtifactRef::new(id, true);
        assert_eq!(r.download_path, "/api/v1/download/0123456789abcdef0123456789abcdef");
    }
}
