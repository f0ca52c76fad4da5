//! Table error types
//!
//! Error codes:
//! - TABLESET_SCHEMA_VIOLATION
//! - TABLESET_ARITY_MISMATCH
//! - TABLESET_UNKNOWN_KEY
//! - TABLESET_MISSING_INDEX
//! - TABLESET_UNORDERABLE_FIELD
//! - TABLESET_UNKNOWN_STORE
//!
//! Every table error is a caller error. Errors are raised before any
//! mutation takes place, so a failed call leaves the store untouched.

use std::fmt;

use super::record::RecordKey;

/// Table-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableErrorCode {
    /// Undeclared field, duplicate field, or a value of the wrong shape
    SchemaViolation,
    /// Parallel argument lists of different lengths
    ArityMismatch,
    /// Record key not present in the store
    UnknownKey,
    /// Operation requires an index that does not exist
    StaleIndexAssumption,
    /// Multi-valued sort field without a comparator
    Unorderable,
    /// Store is not one of the stores a bucketization was run over
    UnknownStore,
}

impl TableErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            TableErrorCode::SchemaViolation => "TABLESET_SCHEMA_VIOLATION",
            TableErrorCode::ArityMismatch => "TABLESET_ARITY_MISMATCH",
            TableErrorCode::UnknownKey => "TABLESET_UNKNOWN_KEY",
            TableErrorCode::StaleIndexAssumption => "TABLESET_MISSING_INDEX",
            TableErrorCode::Unorderable => "TABLESET_UNORDERABLE_FIELD",
            TableErrorCode::UnknownStore => "TABLESET_UNKNOWN_STORE",
        }
    }
}

impl fmt::Display for TableErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Table error with code and context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableError {
    code: TableErrorCode,
    message: String,
}

impl TableError {
    fn new(code: TableErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Generic schema violation
    pub fn schema_violation(reason: impl Into<String>) -> Self {
        Self::new(TableErrorCode::SchemaViolation, reason)
    }

    /// Field referenced but not declared in the store
    pub fn undeclared_field(store: &str, field: &str) -> Self {
        Self::new(
            TableErrorCode::SchemaViolation,
            format!("field '{}' is not declared in '{}'", field, store),
        )
    }

    /// Field declared twice
    pub fn duplicate_field(store: &str, field: &str) -> Self {
        Self::new(
            TableErrorCode::SchemaViolation,
            format!("field '{}' already exists in '{}'", field, store),
        )
    }

    /// Parallel lists of different lengths
    pub fn arity_mismatch(what: &str, left: usize, right: usize) -> Self {
        Self::new(
            TableErrorCode::ArityMismatch,
            format!("{}: {} vs {}", what, left, right),
        )
    }

    /// Record key not present
    pub fn unknown_key(store: &str, key: RecordKey) -> Self {
        Self::new(
            TableErrorCode::UnknownKey,
            format!("no record with key {} in '{}'", key, store),
        )
    }

    /// Index required but absent
    pub fn missing_index(store: &str, field: &str) -> Self {
        Self::new(
            TableErrorCode::StaleIndexAssumption,
            format!("no index on field '{}' in '{}'", field, store),
        )
    }

    /// Multi-valued sort field with no comparator
    pub fn unorderable(field: &str) -> Self {
        Self::new(
            TableErrorCode::Unorderable,
            format!(
                "field '{}' is multi-valued and needs an explicit comparator",
                field
            ),
        )
    }

    /// Store not taking part in a bucketization
    pub fn unknown_store(store: &str) -> Self {
        Self::new(
            TableErrorCode::UnknownStore,
            format!("store '{}' is not part of this bucketization", store),
        )
    }

    /// Returns the error code
    pub fn code(&self) -> TableErrorCode {
        self.code
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[ERROR] {}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for TableError {}

/// Result type for table operations
pub type TableResult<T> = Result<T, TableError>;
