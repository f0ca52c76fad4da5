//! Delimited record output
//!
//! Lines go through a `csv` writer with quoting off and `\n` line ends.

use std::io::Write;

use csv::{QuoteStyle, Terminator, WriterBuilder};

use super::errors::{ReportError, ReportResult};
use crate::query::SortSpec;
use crate::store::{RecordKey, RecordStore, TableError};

/// Layout of written records
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFormat {
    /// Fields to write, in order; all store fields when `None`
    pub fields: Option<Vec<String>>,
    /// Column separator, a single byte
    pub delimiter: String,
    /// Write a header line first
    pub header: bool,
}

impl Default for RecordFormat {
    fn default() -> Self {
        Self {
            fields: None,
            delimiter: "\t".to_string(),
            header: false,
        }
    }
}

impl RecordFormat {
    /// Tab-separated, all fields, with a header line
    pub fn with_header() -> Self {
        Self {
            header: true,
            ..Self::default()
        }
    }

    /// Restricts output to `fields`
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }
}

/// Writes `fields` as one delimited line
pub fn write_headers<W, S>(out: &mut W, fields: &[S], delimiter: &str) -> ReportResult<()>
where
    W: Write + ?Sized,
    S: AsRef<str>,
{
    let mut writer = record_writer(out, delimiter)?;
    writer.write_record(fields.iter().map(|f| f.as_ref()))?;
    writer.flush()?;
    Ok(())
}

/// Writes records of `store`, one line each.
///
/// `keys` selects records (all when `None`). Multi-valued fields are
/// joined with their own delimiter; null is written as an empty cell.
pub fn write_records<W>(
    out: &mut W,
    store: &RecordStore,
    keys: Option<&[RecordKey]>,
    sort: Option<&SortSpec>,
    format: &RecordFormat,
) -> ReportResult<()>
where
    W: Write + ?Sized,
{
    let fields: Vec<&str> = match &format.fields {
        Some(fields) => fields.iter().map(String::as_str).collect(),
        None => store.field_names().iter().map(String::as_str).collect(),
    };
    for field in &fields {
        if !store.schema().contains(field) {
            return Err(TableError::undeclared_field(store.name(), field).into());
        }
    }

    let records = store.get_records(keys, sort)?;
    let mut writer = record_writer(out, &format.delimiter)?;

    if format.header {
        writer.write_record(&fields)?;
    }

    for record in records {
        let cells = fields.iter().map(|field| {
            let delimiter = store.delimiter(field).unwrap_or(format.delimiter.as_str());
            record.value(field).render(delimiter)
        });
        writer.write_record(cells)?;
    }
    writer.flush()?;
    Ok(())
}

fn record_writer<'a, W>(out: &'a mut W, delimiter: &str) -> ReportResult<csv::Writer<&'a mut W>>
where
    W: Write + ?Sized,
{
    let delimiter = match delimiter.as_bytes() {
        [byte] => *byte,
        _ => return Err(ReportError::InvalidDelimiter(delimiter.to_string())),
    };
    Ok(WriterBuilder::new()
        .delimiter(delimiter)
        .quote_style(QuoteStyle::Never)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(out))
}
