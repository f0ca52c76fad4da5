//! Delimited text table reader
//!
//! Reads a header block, then one record per data line. Fields are
//! mapped to columns by position; every value is read as text. Each line
//! is split by a `csv` reader with quoting off, so quotes are plain text.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};

use super::errors::{IngestError, IngestResult};
use crate::observability::{self, Event, Severity};
use crate::store::{RecordStore, Scalar, StoreBuilder, Value};

/// How to read a delimited text table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextTableOptions {
    /// Store name
    pub name: String,
    /// Column separator, a single byte
    pub field_delimiter: String,
    /// Lines to skip before the data
    pub header_lines: usize,
    /// Field names in column order. Read from the last header line when absent.
    pub field_names: Option<Vec<String>>,
    /// Multi-valued fields and their value delimiters
    pub multi_valued: HashMap<String, String>,
    /// Skip blank lines and lines starting with `#`
    pub ignore_comments: bool,
    /// Index normalization rule of the resulting store
    pub case_sensitive: bool,
}

impl Default for TextTableOptions {
    fn default() -> Self {
        Self {
            name: String::new(),
            field_delimiter: "\t".to_string(),
            header_lines: 1,
            field_names: None,
            multi_valued: HashMap::new(),
            ignore_comments: false,
            case_sensitive: false,
        }
    }
}

impl TextTableOptions {
    /// Tab-separated, one header line holding the field names
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Line counts from one read
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    /// Every line read, header included
    pub lines_read: usize,
    /// Header lines read
    pub header_lines_read: usize,
    /// Blank and comment lines skipped
    pub lines_skipped: usize,
    /// Records added to the store
    pub records_added: usize,
}

/// A store read from text, with its line counts
#[derive(Debug)]
pub struct TableLoad {
    pub store: RecordStore,
    pub stats: IngestStats,
}

/// Reads a table from `reader`
pub fn read_table<R: BufRead>(reader: R, options: &TextTableOptions) -> IngestResult<TableLoad> {
    read_table_with(reader, options, Some)
}

/// Reads a table, passing each parsed record through `process` first.
///
/// `process` may change the values or return `None` to drop the record.
pub fn read_table_with<R, F>(
    reader: R,
    options: &TextTableOptions,
    mut process: F,
) -> IngestResult<TableLoad>
where
    R: BufRead,
    F: FnMut(Vec<(String, Value)>) -> Option<Vec<(String, Value)>>,
{
    let mut splitter = LineSplitter::new(&options.name, &options.field_delimiter)?;
    let mut stats = IngestStats::default();
    let mut lines = reader.lines();

    // Header
    let mut last_header = None;
    for _ in 0..options.header_lines {
        match lines.next() {
            Some(line) => {
                last_header = Some(line?);
                stats.lines_read += 1;
            }
            None => break,
        }
    }
    stats.header_lines_read = stats.lines_read;

    let field_names = match (&options.field_names, last_header) {
        (Some(names), _) => names.clone(),
        (None, Some(header)) if stats.header_lines_read == options.header_lines => {
            splitter.split(&header)?
        }
        (None, _) if options.header_lines == 0 => {
            return Err(IngestError::MissingHeader(options.name.clone()));
        }
        (None, _) => {
            return Err(IngestError::TruncatedHeader {
                name: options.name.clone(),
                expected: options.header_lines,
                found: stats.header_lines_read,
            });
        }
    };

    let mut builder = StoreBuilder::new(&options.name)
        .fields(field_names.iter().cloned())
        .case_sensitive(options.case_sensitive);
    for (field, delimiter) in &options.multi_valued {
        builder = builder.multi_valued(field, delimiter);
    }
    let mut store = builder.build()?;

    // Data
    for line in lines {
        let line = line?;
        stats.lines_read += 1;

        if options.ignore_comments && is_comment(&line) {
            stats.lines_skipped += 1;
            continue;
        }

        let columns = splitter.split(&line)?;
        let values = parse_line(&store, &field_names, columns);
        if let Some(values) = process(values) {
            store.add_record(values)?;
            stats.records_added += 1;
        }
    }

    Ok(TableLoad { store, stats })
}

/// Opens and reads a table file
pub fn load_table(path: impl AsRef<Path>, options: &TextTableOptions) -> IngestResult<TableLoad> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let load = read_table(BufReader::new(file), options)?;

    let path_str = path.display().to_string();
    let records = load.stats.records_added.to_string();
    let lines = load.stats.lines_read.to_string();
    observability::log_event(
        Severity::Info,
        Event::TableLoaded,
        &[
            ("table", &options.name),
            ("path", &path_str),
            ("records", &records),
            ("lines", &lines),
        ],
    );

    Ok(load)
}

fn is_comment(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.starts_with('#')
}

/// Splits single lines into cells
struct LineSplitter {
    builder: ReaderBuilder,
    record: StringRecord,
}

impl LineSplitter {
    fn new(table: &str, delimiter: &str) -> IngestResult<Self> {
        let delimiter = match delimiter.as_bytes() {
            [byte] => *byte,
            _ => {
                return Err(IngestError::InvalidDelimiter {
                    name: table.to_string(),
                    delimiter: delimiter.to_string(),
                })
            }
        };

        let mut builder = ReaderBuilder::new();
        builder
            .delimiter(delimiter)
            .has_headers(false)
            .flexible(true)
            .quoting(false);
        Ok(Self {
            builder,
            record: StringRecord::new(),
        })
    }

    /// Cells of `line`; a blank line has none
    fn split(&mut self, line: &str) -> IngestResult<Vec<String>> {
        let line = line.trim_end_matches(['\r', '\n']);
        let mut reader = self.builder.from_reader(line.as_bytes());
        if !reader.read_record(&mut self.record)? {
            return Ok(Vec::new());
        }
        Ok(self.record.iter().map(str::to_string).collect())
    }
}

fn parse_line(
    store: &RecordStore,
    field_names: &[String],
    columns: Vec<String>,
) -> Vec<(String, Value)> {
    // extra columns are ignored; missing ones take the field default
    field_names
        .iter()
        .zip(columns)
        .map(|(field, cell)| {
            let value = match store.delimiter(field) {
                Some(value_delimiter) => Value::List(
                    cell.split(value_delimiter)
                        .map(str::trim)
                        .filter(|item| !item.is_empty())
                        .map(Scalar::from)
                        .collect(),
                ),
                None if cell.is_empty() => Value::Null,
                None => Value::str(cell),
            };
            (field.clone(), value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn read(text: &str, options: &TextTableOptions) -> IngestResult<TableLoad> {
        read_table(Cursor::new(text.to_string()), options)
    }

    #[test]
    fn test_header_names_and_values() {
        let mut options = TextTableOptions::new("genes");
        options.multi_valued.insert("synonyms".to_string(), ",".to_string());

        let text = "id\tsymbol\tsynonyms\r\nG1\tPax6\tsey, Dey ,\r\nG2\t\nG3\tAbl1\tx\textra\n";
        let load = read(text, &options).unwrap();
        let store = &load.store;

        assert_eq!(store.field_names(), &["id", "symbol", "synonyms"]);
        assert_eq!(store.len(), 3);

        let g1 = store.get_record(0).unwrap();
        assert_eq!(g1.value("synonyms"), &Value::list(["sey", "Dey"]));

        let g2 = store.get_record(1).unwrap();
        assert!(g2.value("symbol").is_null());
        assert_eq!(g2.value("synonyms"), &Value::List(vec![]));

        let g3 = store.get_record(2).unwrap();
        assert_eq!(g3.value("symbol"), &Value::str("Abl1"));

        assert_eq!(load.stats.lines_read, 4);
        assert_eq!(load.stats.header_lines_read, 1);
        assert_eq!(load.stats.records_added, 3);
    }

    #[test]
    fn test_explicit_field_names_skip_headers() {
        let mut options = TextTableOptions::new("t");
        options.header_lines = 2;
        options.field_names = Some(vec!["a".to_string(), "b".to_string()]);
        options.field_delimiter = ",".to_string();

        let load = read("junk\nmore junk\n1,2\n", &options).unwrap();
        assert_eq!(load.store.len(), 1);
        assert_eq!(load.store.get_record(0).unwrap().value("b"), &Value::str("2"));
    }

    #[test]
    fn test_comments() {
        let mut options = TextTableOptions::new("t");
        let text = "id\n# note\n\n  \nA\n";

        let load = read(text, &options).unwrap();
        assert_eq!(load.store.len(), 4);

        options.ignore_comments = true;
        let load = read(text, &options).unwrap();
        assert_eq!(load.store.len(), 1);
        assert_eq!(load.stats.lines_skipped, 3);
    }

    #[test]
    fn test_trailing_blank_line_is_null_record() {
        let load = read("id\tname\nA\tx\n\n", &TextTableOptions::new("t")).unwrap();
        assert_eq!(load.store.len(), 2);
        let blank = load.store.get_record(1).unwrap();
        assert!(blank.value("id").is_null() && blank.value("name").is_null());
    }

    #[test]
    fn test_quotes_are_plain_text() {
        let mut options = TextTableOptions::new("t");
        options.field_delimiter = ",".to_string();
        let load = read("id,note\nA,\"x,y\"\n", &options).unwrap();
        let record = load.store.get_record(0).unwrap();
        assert_eq!(record.value("note"), &Value::str("\"x"));
    }

    #[test]
    fn test_delimiter_must_be_one_byte() {
        let mut options = TextTableOptions::new("t");
        options.field_delimiter = "::".to_string();
        let err = read("a::b\n", &options).unwrap_err();
        assert!(matches!(err, IngestError::InvalidDelimiter { .. }));

        options.field_delimiter = String::new();
        assert!(read("a\n", &options).is_err());
    }

    #[test]
    fn test_missing_header() {
        let mut options = TextTableOptions::new("t");
        options.header_lines = 0;
        let err = read("a\tb\n", &options).unwrap_err();
        assert!(matches!(err, IngestError::MissingHeader(_)));

        options.header_lines = 3;
        let err = read("a\tb\n", &options).unwrap_err();
        assert!(matches!(err, IngestError::TruncatedHeader { found: 1, .. }));
    }

    #[test]
    fn test_duplicate_header_fields() {
        let options = TextTableOptions::new("t");
        let err = read("id\tid\n", &options).unwrap_err();
        assert!(matches!(err, IngestError::Table(_)));
    }

    #[test]
    fn test_process_hook_drops_records() {
        let options = TextTableOptions::new("t");
        let load = read_table_with(Cursor::new("id\nA\nB\n"), &options, |values| {
            let keep = values.iter().any(|(_, v)| v == &Value::str("B"));
            keep.then_some(values)
        })
        .unwrap();
        assert_eq!(load.store.len(), 1);
        assert_eq!(load.stats.lines_read, 3);
    }
}
