//! Bucketizer
//!
//! Groups the records of two stores into connected components linked by
//! shared values on paired fields, and classifies each component by how
//! many records it holds from each side.
//!
//! # Flow
//!
//! 1. `Bucketizer::new` validates the field pairs and their indexes
//! 2. `run` merges items value by value and partitions them by shape
//! 3. The returned `Bucketization` answers per-record queries and can
//!    annotate either store
//!
//! Any one shared value on any one pair is enough to merge two records.

mod annotate;
mod bucketizer;
mod item;

pub use annotate::{AnnotationSpec, KEY_FIELD};
pub use bucketizer::{Bucketization, Bucketizer};
pub use item::{BucketItem, BucketShape, Cohorts, Side};
