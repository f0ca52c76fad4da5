//! Join Engine
//!
//! Nested-loop equi-join driven by the right store's index: every left
//! record probes the index once per join value, so cost follows the
//! number of matches rather than the product of the store sizes.

mod engine;

pub use engine::{join_on_eq, simple_join_on_eq, JoinSide};
