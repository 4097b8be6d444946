// ## src/telemetry/snapshot.rs

//! telemetry/snapshot.rs
//! Immutable end-of-job report attached to the conversion outcome and the
//! conversion audit event.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::telemetry::counters::ConversionCounters;
use crate::telemetry::timers::{Stage, StageTimes, TelemetryTimer};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionSnapshot {
    pub counters: ConversionCounters,
    pub elapsed_ms: f64,
    pub stage_ms: BTreeMap<Stage, f64>,
    #[serde(skip)]
    stage_times: StageTimes,
    #[serde(skip)]
    elapsed: Duration,
}

impl ConversionSnapshot {
    pub fn from(counters: &ConversionCounters, timer: &TelemetryTimer) -> Self {
        let elapsed = timer.elapsed();
        Self {
            counters: counters.clone(),
            elapsed_ms: elapsed.as_secs_f64() * 1_000.0,
            stage_ms: timer.stage_times.as_millis_map(),
            stage_times: timer.stage_times.clone(),
            elapsed,
        }
    }

    pub fn has_all_stages(&self, expected: &[Stage]) -> bool {
        self.stage_times.has_all(expected)
    }

    /// Stage sum never exceeds wall time.
    pub fn sanity_check(&self) -> bool {
        self.stage_times.total() <= self.elapsed
    }
}
