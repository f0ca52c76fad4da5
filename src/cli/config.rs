//! Command configuration files
//!
//! JSON files, one per command. Table paths are relative to the
//! directory holding the config file.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::errors::{CliError, CliResult};
use crate::ingest::TextTableOptions;
use crate::observability::{self, Event, Logger, Severity};

/// One delimited text table to load
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableConfig {
    /// File to read (required)
    pub path: PathBuf,

    /// Store name (optional, default: file stem)
    #[serde(default)]
    pub name: Option<String>,

    /// Column separator, one byte (optional, default tab)
    #[serde(default = "default_field_delimiter")]
    pub field_delimiter: String,

    /// Header lines to skip (optional, default 1)
    #[serde(default = "default_header_lines")]
    pub header_lines: usize,

    /// Field names; read from the last header line when absent
    #[serde(default)]
    pub field_names: Option<Vec<String>>,

    /// Multi-valued fields and their value delimiters
    #[serde(default)]
    pub multi_valued: HashMap<String, String>,

    /// Skip blank and `#` lines (optional, default false)
    #[serde(default)]
    pub ignore_comments: bool,

    /// Case-sensitive index values (optional, default false)
    #[serde(default)]
    pub case_sensitive: bool,
}

fn default_field_delimiter() -> String {
    "\t".to_string()
}
fn default_header_lines() -> usize {
    1
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_left_tag() -> String {
    "1".to_string()
}
fn default_right_tag() -> String {
    "2".to_string()
}
fn default_join_name() -> String {
    "join".to_string()
}

impl TableConfig {
    /// Store name: the configured one, else the file stem
    pub fn store_name(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => self
                .path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| "table".to_string()),
        }
    }

    /// Reader options for this table
    pub fn options(&self) -> TextTableOptions {
        TextTableOptions {
            name: self.store_name(),
            field_delimiter: self.field_delimiter.clone(),
            header_lines: self.header_lines,
            field_names: self.field_names.clone(),
            multi_valued: self.multi_valued.clone(),
            ignore_comments: self.ignore_comments,
            case_sensitive: self.case_sensitive,
        }
    }

    fn resolve(&mut self, base: &Path) {
        if self.path.is_relative() {
            self.path = base.join(&self.path);
        }
    }

    fn validate(&self, side: &str) -> CliResult<()> {
        if self.field_delimiter.len() != 1 {
            return Err(CliError::config_error(format!(
                "{}: field_delimiter must be a single byte, got {:?}",
                side, self.field_delimiter
            )));
        }
        if self.field_names.is_none() && self.header_lines == 0 {
            return Err(CliError::config_error(format!(
                "{}: field_names are required when header_lines is 0",
                side
            )));
        }
        Ok(())
    }
}

/// `tableset bucketize` configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketizeConfig {
    /// First table (A)
    pub left: TableConfig,

    /// Second table (B)
    pub right: TableConfig,

    /// Paired `[left_field, right_field]` match keys (required, non-empty)
    pub match_fields: Vec<[String; 2]>,

    /// Fields written for A records (optional, default all)
    #[serde(default)]
    pub left_report_fields: Option<Vec<String>>,

    /// Fields written for B records (optional, default all)
    #[serde(default)]
    pub right_report_fields: Option<Vec<String>>,

    /// Minimum log severity (optional, default "info")
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl BucketizeConfig {
    /// Left and right match field lists
    pub fn field_lists(&self) -> (Vec<&str>, Vec<&str>) {
        self.match_fields
            .iter()
            .map(|[l, r]| (l.as_str(), r.as_str()))
            .unzip()
    }
}

/// `tableset join` configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinConfig {
    /// Probing table
    pub left: TableConfig,

    /// Indexed table
    pub right: TableConfig,

    /// Join field of the left table (required)
    pub left_field: String,

    /// Join field of the right table (required)
    pub right_field: String,

    /// Prefix of left output fields (optional, default "1")
    #[serde(default = "default_left_tag")]
    pub left_tag: String,

    /// Prefix of right output fields (optional, default "2")
    #[serde(default = "default_right_tag")]
    pub right_tag: String,

    /// Name of the joined table (optional, default "join")
    #[serde(default = "default_join_name")]
    pub name: String,

    /// Output column separator, one byte (optional, default tab)
    #[serde(default = "default_field_delimiter")]
    pub output_delimiter: String,

    /// Minimum log severity (optional, default "info")
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Shared handling of command configs
pub trait CommandConfig: DeserializeOwned {
    /// Both table configs
    fn tables_mut(&mut self) -> [&mut TableConfig; 2];

    /// Configured log level text
    fn log_level(&self) -> &str;

    /// Command-specific checks
    fn validate(&self) -> CliResult<()>;

    /// Parsed log level
    fn severity(&self) -> CliResult<Severity> {
        self.log_level().parse().map_err(CliError::config_error)
    }

    /// Load configuration from file.
    ///
    /// Sets the logger threshold from `log_level` before logging anything.
    fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let mut config: Self = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        for (side, table) in ["left", "right"].into_iter().zip(config.tables_mut()) {
            table.resolve(base);
            table.validate(side)?;
        }
        config.validate()?;
        Logger::set_min_severity(config.severity()?);

        let path_str = path.display().to_string();
        observability::log_event(Severity::Info, Event::ConfigLoaded, &[("path", &path_str)]);

        Ok(config)
    }
}

impl CommandConfig for BucketizeConfig {
    fn tables_mut(&mut self) -> [&mut TableConfig; 2] {
        [&mut self.left, &mut self.right]
    }

    fn log_level(&self) -> &str {
        &self.log_level
    }

    fn validate(&self) -> CliResult<()> {
        if self.match_fields.is_empty() {
            return Err(CliError::config_error("match_fields must not be empty"));
        }
        Ok(())
    }
}

impl CommandConfig for JoinConfig {
    fn tables_mut(&mut self) -> [&mut TableConfig; 2] {
        [&mut self.left, &mut self.right]
    }

    fn log_level(&self) -> &str {
        &self.log_level
    }

    fn validate(&self) -> CliResult<()> {
        if self.output_delimiter.len() != 1 {
            return Err(CliError::config_error(format!(
                "output_delimiter must be a single byte, got {:?}",
                self.output_delimiter
            )));
        }
        if self.left_tag == self.right_tag {
            return Err(CliError::config_error(
                "left_tag and right_tag must differ",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::CliErrorCode;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, json: &str) -> PathBuf {
        let path = dir.path().join("config.json");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(json.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_bucketize_defaults() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"{
                "left": {"path": "a.tsv"},
                "right": {"path": "/data/b.txt", "name": "bee"},
                "match_fields": [["id", "id"], ["symbol", "name"]]
            }"#,
        );

        let config = BucketizeConfig::load(&path).unwrap();
        assert_eq!(config.left.path, dir.path().join("a.tsv"));
        assert_eq!(config.left.store_name(), "a");
        assert_eq!(config.left.field_delimiter, "\t");
        assert_eq!(config.left.header_lines, 1);
        assert!(!config.left.case_sensitive);
        assert_eq!(config.right.path, PathBuf::from("/data/b.txt"));
        assert_eq!(config.right.store_name(), "bee");
        assert_eq!(config.log_level, "info");

        let (left, right) = config.field_lists();
        assert_eq!(left, vec!["id", "symbol"]);
        assert_eq!(right, vec!["id", "name"]);
    }

    #[test]
    fn test_empty_match_fields_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"{"left": {"path": "a"}, "right": {"path": "b"}, "match_fields": []}"#,
        );
        let err = BucketizeConfig::load(&path).unwrap_err();
        assert_eq!(err.code(), &CliErrorCode::ConfigError);
    }

    #[test]
    fn test_join_defaults() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"{
                "left": {"path": "a"},
                "right": {"path": "b"},
                "left_field": "gene",
                "right_field": "symbol"
            }"#,
        );
        let config = JoinConfig::load(&path).unwrap();
        assert_eq!(config.left_tag, "1");
        assert_eq!(config.right_tag, "2");
        assert_eq!(config.name, "join");
        assert_eq!(config.output_delimiter, "\t");
    }

    #[test]
    fn test_bad_log_level() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"{
                "left": {"path": "a"},
                "right": {"path": "b"},
                "left_field": "x",
                "right_field": "y",
                "log_level": "loud"
            }"#,
        );
        assert!(JoinConfig::load(&path).is_err());
    }

    #[test]
    fn test_headerless_table_needs_field_names() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"{
                "left": {"path": "a", "header_lines": 0},
                "right": {"path": "b"},
                "match_fields": [["x", "y"]]
            }"#,
        );
        assert!(BucketizeConfig::load(&path).is_err());
    }

    #[test]
    fn test_delimiters_must_be_one_byte() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"{
                "left": {"path": "a", "field_delimiter": "::"},
                "right": {"path": "b"},
                "match_fields": [["x", "y"]]
            }"#,
        );
        let err = BucketizeConfig::load(&path).unwrap_err();
        assert_eq!(err.code(), &CliErrorCode::ConfigError);
        assert!(err.message().contains("left: field_delimiter"));

        let path = write_config(
            &dir,
            r#"{
                "left": {"path": "a"},
                "right": {"path": "b"},
                "left_field": "x",
                "right_field": "y",
                "output_delimiter": ""
            }"#,
        );
        let err = JoinConfig::load(&path).unwrap_err();
        assert!(err.message().contains("output_delimiter"));
    }

    #[test]
    fn test_missing_file() {
        let err = JoinConfig::load(Path::new("/nonexistent/config.json")).unwrap_err();
        assert_eq!(err.code(), &CliErrorCode::ConfigError);
    }
}
