//! telemetry/mod.rs
//! Per-job counters, stage timers and the immutable snapshot built from them.
//!
//! Notes:
//! - Counters and timers are owned by one job; no atomics or locks.
//! - Snapshots are serde-serializable so they can ride along in audit details.

pub mod counters;
pub mod timers;
pub mod snapshot;

pub use counters::*;
pub use timers::*;
pub use snapshot::*;
