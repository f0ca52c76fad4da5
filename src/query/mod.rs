//! Query/Sort layer
//!
//! Selection by field value and stable multi-key sorting.
//!
//! # Selection
//!
//! 1. If the field is indexed and the probe is a scalar, use the index
//! 2. Otherwise scan every record with the same normalized equality
//! 3. Apply the sort (if specified)
//!
//! # Sorting
//!
//! - Stable with respect to the input key order
//! - Default ordering: null < number < string
//! - Multi-valued fields need an explicit comparator

mod filters;
mod sorter;

pub use filters::ValueMatcher;
pub use sorter::{Comparator, KeySorter, SortKey, SortSpec};
