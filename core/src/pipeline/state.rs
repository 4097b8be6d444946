// ## 📂 File: `src/pipeline/state.rs`

//! pipeline/state.rs
//! Stage bookkeeping and the single failure type a job can end in.
//!
//! Conversion: `Received -> Validated -> Built -> Serialized -> (Encrypted | Plain) -> Persisted -> Completed`
//! Download:   `Located -> Decrypted -> Delivered`
//!
//! Any stage may end the job in `Failure { stage, kind, .. }`.

use std::fmt;
use std::time::Instant;

use serde::Serialize;

use crate::pipeline::job::JobId;
use crate::telemetry::{Stage, TelemetryTimer};
use crate::types::{ConvertError, ErrorKind};

/// A stage error before it is turned into a `Failure`.
#[derive(Debug)]
pub struct StageError {
    pub stage: Stage,
    pub error: ConvertError,
}

impl fmt::Display for StageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} stage failed: {}", self.stage, self.error)
    }
}

impl std::error::Error for StageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Tracks the current stage and charges wall time to it.
#[derive(Debug)]
pub struct StageTracker {
    current: Stage,
    history: Vec<Stage>,
    timer: TelemetryTimer,
}

impl StageTracker {
    pub fn new(initial: Stage) -> Self {
        Self { current: initial, history: Vec::new(), timer: TelemetryTimer::new() }
    }

    pub fn current(&self) -> Stage {
        self.current
    }

    /// Stages entered so far, in order.
    pub fn history(&self) -> &[Stage] {
        &self.history
    }

    /// Enter `stage` and run its work. An error is tagged with `stage`.
    pub fn run<T>(&mut self, stage: Stage, f: impl FnOnce() -> Result<T, ConvertError>) -> Result<T, StageError> {
        self.current = stage;
        self.history.push(stage);
        let started = Instant::now();
        let out = f();
        self.timer.add_stage_time(stage, started.elapsed());
        out.map_err(|error| StageError { stage, error })
    }

    /// Record a stage that does no fallible work.
    pub fn mark(&mut self, stage: Stage) {
        self.current = stage;
        self.history.push(stage);
        self.timer.add_stage_time(stage, std::time::Duration::ZERO);
    }

    pub fn finish(mut self) -> TelemetryTimer {
        self.timer.finish();
        self.timer
    }
}

/// Terminal failure of a conversion or download.
///
/// `message` is safe to hand to callers; `detail` is internal and only leaves
/// the process when error details are explicitly exposed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Failure {
    pub job_id: Option<JobId>,
    pub stage: Stage,
    pub kind: ErrorKind,
    pub message: String,
    #[serde(skip)]
    pub detail: String,
}

impl Failure {
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} (stage {})", self.kind.code(), self.message, self.stage)
    }
}

impl std::error::Error for Failure {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_tags_errors_with_the_entered_stage() {
        let mut t = StageTracker::new(Stage::Received);
        let ok: Result<u8, _> = t.run(Stage::Validated, || Ok(1));
        assert_eq!(ok.unwrap(), 1);
        let err = t.run(Stage::Built, || -> Result<(), ConvertError> { Err(ConvertError::EmptySource) }).unwrap_err();
        assert_eq!(err.stage, Stage::Built);
        assert_eq!(t.current(), Stage::Built);
        assert_eq!(t.history(), &[Stage::Validated, Stage::Built]);
        assert!(t.finish().stage_times.has_all(&[Stage::Validated, Stage::Built]));
    }
}
