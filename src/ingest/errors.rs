//! # Ingest Errors

use thiserror::Error;

use crate::store::TableError;

/// Result type for text ingestion
pub type IngestResult<T> = Result<T, IngestError>;

/// Errors raised while reading a delimited text table
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("{0}")]
    Table(#[from] TableError),

    #[error("Table '{name}' has delimiter {delimiter:?}; expected a single byte")]
    InvalidDelimiter { name: String, delimiter: String },

    // Header errors
    #[error("Table '{0}' has no field names and no header line to read them from")]
    MissingHeader(String),

    #[error("Table '{name}' ended after {found} of {expected} header lines")]
    TruncatedHeader {
        name: String,
        expected: usize,
        found: usize,
    },
}
