//! Observable events
//!
//! Events are explicit and typed.

use std::fmt;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    /// Configuration file parsed
    ConfigLoaded,

    // Tables
    /// Delimited text file read into a store
    TableLoaded,
    /// Index (re)built for one field
    IndexBuilt,

    // Operations
    /// Equi-join produced a result store
    JoinComplete,
    /// Bucketization started
    BucketizeStart,
    /// Bucketization partitioned its items
    BucketizeComplete,
    /// Bucket results written back into a store
    DatasetAnnotated,

    // Output
    /// Report written
    ReportWritten,
}

impl Event {
    /// Returns the string representation used in log lines
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::TableLoaded => "TABLE_LOADED",
            Event::IndexBuilt => "INDEX_BUILT",
            Event::JoinComplete => "JOIN_COMPLETE",
            Event::BucketizeStart => "BUCKETIZE_START",
            Event::BucketizeComplete => "BUCKETIZE_COMPLETE",
            Event::DatasetAnnotated => "DATASET_ANNOTATED",
            Event::ReportWritten => "REPORT_WRITTEN",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
