//! CLI command implementations
//!
//! Each command loads its config, reads both tables, runs one core
//! operation and writes the report to stdout. Logs go to stderr.

use std::io::{self, Write};
use std::path::Path;

use crate::bucket::{BucketShape, Bucketizer};
use crate::ingest::load_table;
use crate::join::simple_join_on_eq;
use crate::observability::{self, Event, Severity};
use crate::report::{write_records, write_summary, BucketReporter, RecordFormat};
use crate::store::RecordStore;

use super::args::{Cli, Command};
use super::config::{BucketizeConfig, CommandConfig, JoinConfig, TableConfig};
use super::errors::CliResult;

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cmd {
        Command::Bucketize { config, bucket } => bucketize(&config, bucket, &mut out),
        Command::Join { config } => join(&config, &mut out),
    }
}

/// Bucketize two tables.
///
/// Writes the bucket summary, or the records of one bucket when `bucket`
/// is given.
pub fn bucketize<W: Write>(config_path: &Path, bucket: Option<BucketShape>, out: &mut W) -> CliResult<()> {
    let config = BucketizeConfig::load(config_path)?;

    let mut left = load(&config.left)?;
    let mut right = load(&config.right)?;

    let (left_fields, right_fields) = config.field_lists();
    left.add_indexes(&left_fields)?;
    right.add_indexes(&right_fields)?;

    let result = Bucketizer::new(&left, &left_fields, &right, &right_fields)?.run();

    match bucket {
        Some(shape) => {
            let mut reporter = BucketReporter::new(&result, &left, &right)?;
            if let Some(fields) = &config.left_report_fields {
                reporter = reporter.left_fields(fields.iter().cloned());
            }
            if let Some(fields) = &config.right_report_fields {
                reporter = reporter.right_fields(fields.iter().cloned());
            }
            reporter.write_bucket(out, shape)?;
        }
        None => write_summary(out, &result)?,
    }
    out.flush()?;

    let report = bucket.map_or("summary", |shape| shape.as_str());
    observability::log_event(Severity::Info, Event::ReportWritten, &[("report", report)]);

    Ok(())
}

/// Join two tables and write the result with a header line
pub fn join<W: Write>(config_path: &Path, out: &mut W) -> CliResult<()> {
    let config = JoinConfig::load(config_path)?;

    let left = load(&config.left)?;
    let mut right = load(&config.right)?;
    right.add_indexes(&[config.right_field.as_str()])?;

    let joined = simple_join_on_eq(
        &config.name,
        &left,
        &config.left_field,
        &right,
        &config.right_field,
        &config.left_tag,
        &config.right_tag,
    )?;

    let format = RecordFormat {
        delimiter: config.output_delimiter.clone(),
        ..RecordFormat::with_header()
    };
    write_records(out, &joined, None, None, &format)?;
    out.flush()?;

    let records = joined.len().to_string();
    observability::log_event(
        Severity::Info,
        Event::ReportWritten,
        &[("report", joined.name()), ("records", &records)],
    );

    Ok(())
}

fn load(table: &TableConfig) -> CliResult<RecordStore> {
    Ok(load_table(&table.path, &table.options())?.store)
}
