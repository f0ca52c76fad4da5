//! tableset - in-memory tabular data engine
//!
//! Named record stores with secondary indexes, stable multi-key sorting,
//! index-driven equi-joins, and bipartite bucketing of two stores into
//! 1:0, 0:1, 1:1, 1:n, n:1 and n:m groups.

pub mod bucket;
pub mod cli;
pub mod index;
pub mod ingest;
pub mod join;
pub mod observability;
pub mod query;
pub mod report;
pub mod store;

pub use bucket::{AnnotationSpec, BucketItem, BucketShape, Bucketization, Bucketizer, Cohorts, Side};
pub use join::{join_on_eq, simple_join_on_eq, JoinSide};
pub use query::SortSpec;
pub use store::{
    Record, RecordKey, RecordStore, Scalar, StoreBuilder, StoreId, TableError, TableErrorCode,
    TableResult, Value,
};
