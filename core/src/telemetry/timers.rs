// ## src/telemetry/timers.rs

//! telemetry/timers.rs
//! Pipeline stages and per-stage durations.

use std::collections::BTreeMap;
use std::fmt;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// Pipeline stages, in the order a conversion or download passes through them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Received,
    Validated,
    Built,
    Serialized,
    Encrypted,
    Plain,
    Persisted,
    Completed,
    Located,
    Decrypted,
    Delivered,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Received   => "received",
            Stage::Validated  => "validated",
            Stage::Built      => "built",
            Stage::Serialized => "serialized",
            Stage::Encrypted  => "encrypted",
            Stage::Plain      => "plain",
            Stage::Persisted  => "persisted",
            Stage::Completed  => "completed",
            Stage::Located    => "located",
            Stage::Decrypted  => "decrypted",
            Stage::Delivered  => "delivered",
        };
        f.write_str(name)
    }
}

/// Accumulated wall time per stage. Ordered map so serialized output is stable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StageTimes {
    times: BTreeMap<Stage, Duration>,
}

impl StageTimes {
    /// Add duration to a stage (accumulates if already present).
    pub fn add(&mut self, stage: Stage, dur: Duration) {
        *self.times.entry(stage).or_insert(Duration::ZERO) += dur;
    }

    pub fn total(&self) -> Duration {
        self.times.values().copied().sum()
    }

    /// Every listed stage was recorded (a recorded stage may take ~0ns).
    pub fn has_all(&self, expected: &[Stage]) -> bool {
        expected.iter().all(|s| self.times.contains_key(s))
    }

    /// Stage -> milliseconds, for reports.
    pub fn as_millis_map(&self) -> BTreeMap<Stage, f64> {
        self.times.iter().map(|(s, d)| (*s, d.as_secs_f64() * 1_000.0)).collect()
    }
}

#[derive(Debug, Clone)]
pub struct TelemetryTimer {
    start_time: Instant,
    end_time: Option<Instant>,
    pub stage_times: StageTimes,
}

impl Default for TelemetryTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetryTimer {
    pub fn new() -> Self {
        Self { start_time: Instant::now(), end_time: None, stage_times: StageTimes::default() }
    }

    pub fn finish(&mut self) {
        self.end_time = Some(Instant::now());
    }

    pub fn add_stage_time(&mut self, stage: Stage, dur: Duration) {
        self.stage_times.add(stage, dur);
    }

    pub fn elapsed(&self) -> Duration {
        match self.end_time {
            Some(end) => end.duration_since(self.start_time),
            None => Instant::now().duration_since(self.start_time),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_stages_accumulate() {
        let mut timer = TelemetryTimer::new();
        timer.add_stage_time(Stage::Built, Duration::from_millis(2));
        timer.add_stage_time(Stage::Built, Duration::from_millis(3));
        timer.finish();

        let ms = timer.stage_times.as_millis_map();
        assert_eq!(ms.len(), 1);
        assert!((ms[&Stage::Built] - 5.0).abs() < 1e-9);
        assert_eq!(timer.stage_times.total(), Duration::from_millis(5));
        assert!(timer.stage_times.has_all(&[Stage::Built]));
        assert!(!timer.stage_times.has_all(&[Stage::Plain]));
    }

    #[test]
    fn stage_names_are_snake_case() {
        assert_eq!(Stage::Serialized.to_string(), "serialized");
        assert_eq!(serde_json::to_string(&Stage::Decrypted).unwrap(), "\"decrypted\"");
    }
}
