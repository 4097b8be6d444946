//! audit/mod.rs
//! Structured audit trail, separate from diagnostic logging.

pub mod event;
pub mod sink;

pub use event::*;
pub use sink::*;
