//! Record Store
//!
//! A store is a named table of records. Every record carries a value for
//! every declared field, keyed by a store-assigned integer that is never
//! reused.
//!
//! Values are null, a scalar (integer, float, text), or for multi-valued
//! fields an ordered list of scalars. Secondary indexes map normalized
//! values to record keys and are kept current on every mutation.

mod errors;
mod record;
mod schema;
#[allow(clippy::module_inception)]
mod store;
mod value;

pub use errors::{TableError, TableErrorCode, TableResult};
pub use record::{Record, RecordKey};
pub use schema::Schema;
pub use store::{RecordStore, StoreBuilder, StoreId};
pub use value::{Scalar, Value};
