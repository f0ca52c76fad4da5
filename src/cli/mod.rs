//! CLI module for tableset
//!
//! Provides command-line interface for:
//! - bucketize: Cluster two tables on paired fields and report buckets
//! - join: Equi-join two tables and write the result

mod args;
mod commands;
mod config;
mod errors;

pub use args::{Cli, Command};
pub use commands::{bucketize, join, run, run_command};
pub use config::{BucketizeConfig, CommandConfig, JoinConfig, TableConfig};
pub use errors::{CliError, CliErrorCode, CliResult};
