// ## 📂 File: `src/storage.rs`

//! storage.rs
//! Flat, job-keyed file layout for uploads and generated artifacts.
//!
//! Layout:
//! ```text
//! upload_dir/<job>_input<ext>      transient, removed by ScopedFile
//! output_dir/<job>.xml             plain artifact
//! output_dir/<job>.xml.enc         encrypted artifact (base64 text)
//! output_dir/<name>.part           in-flight write, renamed into place
//! output_dir/<name>.claimed        artifact taken by a download
//! ```
//!
//! Design notes:
//! - Jobs own disjoint paths, so no locking is needed between requests.
//! - Artifacts appear atomically (write `.part`, then rename).
//! - A download claims the artifact with a rename; exactly one claimant wins.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::constants::suffixes;
use crate::pipeline::job::JobId;
use crate::types::ConvertError;

/// Removes its path when dropped. Missing files are not an error.
#[derive(Debug)]
pub struct ScopedFile {
    path: PathBuf,
}

impl ScopedFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScopedFile {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "scoped file removed"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path.display(), error = %e, "failed to remove scoped file"),
        }
    }
}

/// Artifact found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredArtifact {
    pub path: PathBuf,
    pub encrypted: bool,
}

/// Artifact taken by one downloader. Restored to its original name on drop
/// unless `consume` or `release` is called.
#[derive(Debug)]
pub struct ClaimedArtifact {
    original: PathBuf,
    claimed: PathBuf,
    encrypted: bool,
    settled: bool,
}

impl ClaimedArtifact {
    pub fn path(&self) -> &Path {
        &self.claimed
    }

    pub fn encrypted(&self) -> bool {
        self.encrypted
    }

    /// Delete the artifact for good.
    pub fn consume(mut self) -> io::Result<()> {
        self.settled = true;
        remove_if_exists(&self.claimed)
    }

    /// Put the artifact back under its original name.
    pub fn release(mut self) -> io::Result<()> {
        self.settled = true;
        fs::rename(&self.claimed, &self.original)
    }
}

impl Drop for ClaimedArtifact {
    fn drop(&mut self) {
        if !self.settled {
            if let Err(e) = fs::rename(&self.claimed, &self.original) {
                warn!(path = %self.claimed.display(), error = %e, "failed to restore claimed artifact");
            }
        }
    }
}

fn remove_if_exists(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut s = path.as_os_str().to_owned();
    s.push(suffix);
    PathBuf::from(s)
}

#[derive(Debug, Clone)]
pub struct ArtifactStore {
    output_dir: PathBuf,
    upload_dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(output_dir: impl Into<PathBuf>, upload_dir: impl Into<PathBuf>) -> Self {
        Self { output_dir: output_dir.into(), upload_dir: upload_dir.into() }
    }

    /// Create both directories (idempotent).
    pub fn bootstrap(&self) -> io::Result<()> {
        fs::create_dir_all(&self.output_dir)?;
        fs::create_dir_all(&self.upload_dir)?;
        debug!(
            output_dir = %self.output_dir.display(),
            upload_dir = %self.upload_dir.display(),
            "artifact store ready"
        );
        Ok(())
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    /// `upload_dir/<job>_input<ext>`; `ext` includes the dot.
    pub fn upload_path(&self, job: &JobId, ext: &str) -> PathBuf {
        self.upload_dir.join(format!("{}{}{}", job, suffixes::INPUT, ext))
    }

    /// Persist uploaded bytes; the returned guard deletes them on drop.
    pub fn write_upload(&self, job: &JobId, ext: &str, bytes: &[u8]) -> Result<ScopedFile, ConvertError> {
        let path = self.upload_path(job, ext);
        let guard = ScopedFile::new(path);
        fs::write(guard.path(), bytes)?;
        Ok(guard)
    }

    pub fn artifact_path(&self, job: &JobId, encrypted: bool) -> PathBuf {
        let suffix = if encrypted { suffixes::ENCRYPTED } else { suffixes::PLAIN };
        self.output_dir.join(format!("{}{}", job, suffix))
    }

    /// Write the final artifact through a `.part` file and rename it into place.
    pub fn write_artifact(&self, job: &JobId, encrypted: bool, bytes: &[u8]) -> Result<PathBuf, ConvertError> {
        let target = self.artifact_path(job, encrypted);
        let partial = with_suffix(&target, suffixes::PARTIAL);

        let written = (|| -> io::Result<()> {
            let mut file = File::create(&partial)?;
            file.write_all(bytes)?;
            file.sync_all()?;
            fs::rename(&partial, &target)
        })();

        if let Err(e) = written {
            let _ = remove_if_exists(&partial);
            return Err(e.into());
        }
        Ok(target)
    }

    /// Find the artifact for `job`, preferring the encrypted form.
    pub fn locate(&self, job: &JobId) -> Result<StoredArtifact, ConvertError> {
        for encrypted in [true, false] {
            let path = self.artifact_path(job, encrypted);
            if path.is_file() {
                return Ok(StoredArtifact { path, encrypted });
            }
        }
        Err(ConvertError::ArtifactNotFound { reference: job.to_string() })
    }

    /// Take exclusive ownership of the artifact for one download.
    /// A concurrent or later claim on the same job sees `ArtifactNotFound`.
    pub fn claim(&self, job: &JobId) -> Result<ClaimedArtifact, ConvertError> {
        let found = self.locate(job)?;
        let claimed = with_suffix(&found.path, suffixes::CLAIMED);
        match fs::rename(&found.path, &claimed) {
            Ok(()) => Ok(ClaimedArtifact {
                original: found.path,
                claimed,
                encrypted: found.encrypted,
                settled: false,
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(ConvertError::ArtifactNotFound { reference: job.to_string() })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Delete every file the job may have left in the output directory.
    pub fn remove_artifacts(&self, job: &JobId) -> io::Result<()> {
        for encrypted in [true, false] {
            let path = self.artifact_path(job, encrypted);
            remove_if_exists(&with_suffix(&path, suffixes::PARTIAL))?;
            remove_if_exists(&with_suffix(&path, suffixes::CLAIMED))?;
            remove_if_exists(&path)?;
        }
        Ok(())
    }
}
