//! # Report Errors

use thiserror::Error;

use crate::store::TableError;

/// Result type for report writers
pub type ReportResult<T> = Result<T, ReportError>;

/// Errors raised while writing a report
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("{0}")]
    Table(#[from] TableError),

    #[error("Output delimiter {0:?} is not a single byte")]
    InvalidDelimiter(String),
}
