//! Index Manager subsystem
//!
//! Indexes are derived, in-memory state owned by a store.
//!
//! # Design Principles
//!
//! - Derived state: indexes mirror records, never the source of truth
//! - Synchronous: every record mutation updates its indexes before returning
//! - Deterministic: BTreeMap iteration order, sorted record keys
//!
//! # Normalization
//!
//! - Null values are never indexed
//! - Values are indexed by their canonical text
//! - Case-insensitive stores lower-case that text
//! - Multi-valued fields index every element separately

mod btree;
mod manager;

pub use btree::IndexTree;
pub use manager::IndexManager;
