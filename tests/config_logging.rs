//! Config Logging Tests
//!
//! Loading a command config applies its log level to the global logger.
//! Kept in its own test binary so no other test moves the threshold.

use std::fs;

use tableset::cli::{BucketizeConfig, CommandConfig};
use tableset::observability::{Logger, Severity};
use tempfile::TempDir;

// =============================================================================
// Threshold Tests
// =============================================================================

/// The threshold is set by `load` itself, before its own log line.
#[test]
fn test_load_applies_log_level() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bucketize.json");
    fs::write(
        &path,
        r#"{
            "left": {"path": "a.tsv"},
            "right": {"path": "b.tsv"},
            "match_fields": [["id", "id"]],
            "log_level": "warn"
        }"#,
    )
    .unwrap();

    assert_eq!(Logger::min_severity(), Severity::Info);
    BucketizeConfig::load(&path).unwrap();
    assert_eq!(Logger::min_severity(), Severity::Warn);
    assert!(!Logger::enabled(Severity::Info));
}
