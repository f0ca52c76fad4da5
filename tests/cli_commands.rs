//! CLI Command Tests
//!
//! Runs the bucketize and join commands against config and table files
//! in a temporary directory, capturing their report output.

use std::fs;
use std::path::{Path, PathBuf};

use tableset::cli::{self, CliErrorCode};
use tableset::BucketShape;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

const ALLELES: &str = "\
allele\tgene
a1\tPax6
a2\tpax6
a3\tKit
a4\tFgf8
";

const GENES: &str = "\
id,symbol
G1,PAX6
G2,Kit
G3,Kit
G4,Shh
";

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("alleles.tsv"), ALLELES).unwrap();
        fs::write(dir.path().join("genes.csv"), GENES).unwrap();
        Self { dir }
    }

    fn config(&self, name: &str, json: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, json).unwrap();
        path
    }
}

fn run_bucketize(path: &Path, bucket: Option<BucketShape>) -> String {
    let mut out = Vec::new();
    cli::bucketize(path, bucket, &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

const BUCKETIZE_CONFIG: &str = r#"{
    "left": {"path": "alleles.tsv"},
    "right": {"path": "genes.csv", "field_delimiter": ","},
    "match_fields": [["gene", "symbol"]],
    "right_report_fields": ["id"],
    "log_level": "error"
}"#;

// =============================================================================
// Bucketize Tests
// =============================================================================

/// Without a bucket the command writes the shape counts.
#[test]
fn test_bucketize_summary() {
    let ws = Workspace::new();
    let path = ws.config("bucketize.json", BUCKETIZE_CONFIG);

    let summary = run_bucketize(&path, None);
    assert_eq!(summary, "1:0\t1\n0:1\t1\n1:1\t0\n1:n\t1\nn:1\t1\nn:m\t0\n");
}

/// A selected bucket is written in block layout with the report fields.
#[test]
fn test_bucketize_single_bucket() {
    let ws = Workspace::new();
    let path = ws.config("bucketize.json", BUCKETIZE_CONFIG);

    let text = run_bucketize(&path, Some(BucketShape::ManyToOne));
    assert_eq!(text, "[ n-1 BucketItem\na1\tPax6\na2\tpax6\n----\nG1\n]\n");

    let text = run_bucketize(&path, Some(BucketShape::OneToZero));
    assert_eq!(text, "a4\tFgf8\n");
}

/// A case-sensitive table changes which records match.
#[test]
fn test_bucketize_case_sensitive() {
    let ws = Workspace::new();
    let path = ws.config(
        "bucketize.json",
        r#"{
            "left": {"path": "alleles.tsv", "case_sensitive": true},
            "right": {"path": "genes.csv", "field_delimiter": ",", "case_sensitive": true},
            "match_fields": [["gene", "symbol"]],
            "log_level": "error"
        }"#,
    );

    let summary = run_bucketize(&path, None);
    assert_eq!(summary, "1:0\t3\n0:1\t2\n1:1\t0\n1:n\t1\nn:1\t0\nn:m\t0\n");
}

/// An unknown match field is reported as a table error.
#[test]
fn test_bucketize_unknown_field() {
    let ws = Workspace::new();
    let path = ws.config(
        "bucketize.json",
        r#"{
            "left": {"path": "alleles.tsv"},
            "right": {"path": "genes.csv", "field_delimiter": ","},
            "match_fields": [["nope", "symbol"]],
            "log_level": "error"
        }"#,
    );

    let err = cli::bucketize(&path, None, &mut Vec::<u8>::new()).unwrap_err();
    assert_eq!(err.code(), &CliErrorCode::TableError);
}

/// A missing table file is reported as an I/O failure of ingest.
#[test]
fn test_bucketize_missing_table() {
    let ws = Workspace::new();
    let path = ws.config(
        "bucketize.json",
        r#"{
            "left": {"path": "absent.tsv"},
            "right": {"path": "genes.csv", "field_delimiter": ","},
            "match_fields": [["gene", "symbol"]],
            "log_level": "error"
        }"#,
    );

    let err = cli::bucketize(&path, None, &mut Vec::<u8>::new()).unwrap_err();
    assert_eq!(err.code(), &CliErrorCode::IngestError);
}

// =============================================================================
// Join Tests
// =============================================================================

/// The join writes a header line then one line per matching pair.
#[test]
fn test_join_output() {
    let ws = Workspace::new();
    let path = ws.config(
        "join.json",
        r#"{
            "left": {"path": "alleles.tsv"},
            "right": {"path": "genes.csv", "field_delimiter": ","},
            "left_field": "gene",
            "right_field": "symbol",
            "left_tag": "a.",
            "right_tag": "g.",
            "output_delimiter": ",",
            "log_level": "error"
        }"#,
    );

    let mut out = Vec::new();
    cli::join(&path, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();

    assert_eq!(
        text,
        "a.allele,a.gene,g.id,g.symbol\n\
         a1,Pax6,G1,PAX6\n\
         a2,pax6,G1,PAX6\n\
         a3,Kit,G2,Kit\n\
         a3,Kit,G3,Kit\n"
    );
}

/// Equal tags are rejected before any table is read.
#[test]
fn test_join_equal_tags_rejected() {
    let ws = Workspace::new();
    let path = ws.config(
        "join.json",
        r#"{
            "left": {"path": "absent.tsv"},
            "right": {"path": "genes.csv"},
            "left_field": "gene",
            "right_field": "symbol",
            "left_tag": "x",
            "right_tag": "x"
        }"#,
    );

    let err = cli::join(&path, &mut Vec::<u8>::new()).unwrap_err();
    assert_eq!(err.code(), &CliErrorCode::ConfigError);
}
