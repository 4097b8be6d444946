//! headers/mod.rs
//! Header metadata supplied with a conversion request.
//!
//! Accepted JSON shapes:
//! - `[{"name": "Region", "value": "North"}]` (also `tagName`/`tagValue`)
//! - `{"Region": "North"}` (object order preserved)

pub mod types;
pub mod decode;

pub use types::*;
pub use decode::*;
