//! Text ingestion
//!
//! Loads delimited text files into record stores.
//!
//! # Line handling
//!
//! - The first `header_lines` lines are header; field names come from the
//!   last one unless given explicitly
//! - Trailing `\r` and `\n` are stripped
//! - With `ignore_comments`, blank lines and `#` lines are skipped
//! - Empty single-valued cells are null; multi-valued cells are split on
//!   the field delimiter, trimmed, and empty items dropped

mod errors;
mod reader;

pub use errors::{IngestError, IngestResult};
pub use reader::{load_table, read_table, read_table_with, IngestStats, TableLoad, TextTableOptions};
