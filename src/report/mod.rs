//! Reporting
//!
//! Writes stores and bucket results as delimited text.

mod buckets;
mod errors;
mod writer;

pub use buckets::{write_summary, BucketReporter};
pub use errors::{ReportError, ReportResult};
pub use writer::{write_headers, write_records, RecordFormat};
