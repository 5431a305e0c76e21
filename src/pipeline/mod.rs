pub mod extraction;
pub mod reconcile;
pub mod validation;
pub mod processor;
pub mod diagnostic; // Diagnostic events + artifact dump (SECTORSCAN_DUMP_DIR)

use thiserror::Error;

use crate::models::enums::ReportFlavor;

/// Configuration-level failures. Data-quality problems (pattern misses,
/// malformed model payloads, schema gaps, all-invalid reports) are recovered
/// in place and surface as `DiagnosticEvent`s instead.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Canonical schema for {0} report has no indices")]
    EmptySchema(ReportFlavor),

    #[error("Invalid canonical schema: {0}")]
    InvalidSchema(String),

    #[error("Invalid value '{value}' for {field}")]
    InvalidEnum { field: String, value: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON parsing error: {0}")]
    JsonParsing(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
