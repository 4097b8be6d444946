//! source/mod.rs
//! Spreadsheet input: cell model, workbook reader, coercion and schema profiles.

pub mod types;
pub mod coerce;
pub mod reader;
pub mod schema;

pub use types::*;
pub use coerce::{coerce, coerce_to, CoercionMismatch};
pub use reader::{read_workbook, SourceInput};
pub use schema::{ColumnSpec, SchemaProfile};
