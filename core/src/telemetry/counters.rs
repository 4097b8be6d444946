// ### `src/telemetry/counters.rs`

//! telemetry/counters.rs
//! Mutable counters filled in while one conversion runs.
//!
//! Summary: sizes of what went in and what came out at each step.
//! Frozen into `ConversionSnapshot` when the job completes.

use serde::{Deserialize, Serialize};

#[derive(Default, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionCounters {
    pub rows: u64,
    pub columns: u64,
    pub header_fields: u64,
    /// Uploaded spreadsheet size.
    pub bytes_input: u64,
    /// Serialized plaintext XML size.
    pub bytes_xml: u64,
    /// Size of what was written to the output directory.
    pub bytes_artifact: u64,
}

impl ConversionCounters {
    pub fn record_input(&mut self, len: usize) {
        self.bytes_input = len as u64;
    }

    pub fn record_shape(&mut self, rows: usize, columns: usize, header_fields: usize) {
        self.rows = rows as u64;
        self.columns = columns as u64;
        self.header_fields = header_fields as u64;
    }

    pub fn record_xml(&mut self, len: usize) {
        self.bytes_xml = len as u64;
    }

    pub fn record_artifact(&mut self, len: usize) {
        self.bytes_artifact = len as u64;
    }
}
