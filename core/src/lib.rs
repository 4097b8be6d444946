//! sheetxml-core
//!
//! Spreadsheet -> XML conversion engine with at-rest encryption of the output.
//! Synchronous, no async runtime, no HTTP.

#![forbid(unsafe_code)]

// Shared and top level
pub mod constants;
pub mod types;
pub mod utils;
pub mod config;

// Conversion layers
pub mod sanitize;
pub mod source;
pub mod headers;
pub mod xml;
pub mod crypto;
pub mod storage;

// Orchestration and seams
pub mod pipeline;
pub mod audit;
pub mod session;
pub mod telemetry;

// -----------------------------------------------------------------------------
// Prelude
// -----------------------------------------------------------------------------
pub mod prelude {
    pub use crate::audit::{AuditEvent, AuditSink, JsonLinesAuditSink, MemoryAuditSink, NullAuditSink, TracingAuditSink};
    pub use crate::config::ConverterConfig;
    pub use crate::crypto::{CryptoError, FileCipher};
    pub use crate::headers::{HeaderField, HeaderFieldSet};
    pub use crate::pipeline::{
        ArtifactRef, ConversionOutcome, ConversionPipeline, ConversionRequest, DownloadedArtifact, Failure, JobId,
        Upload, ValidationReport,
    };
    pub use crate::session::SessionValidator;
    pub use crate::source::{CellValue, ColumnSpec, ColumnType, SchemaProfile, TabularSource};
    pub use crate::types::{ConvertError, ErrorKind};
    pub use crate::xml::Element;
}
