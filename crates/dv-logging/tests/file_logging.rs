// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Installs the global subscriber, so this binary holds a single test

use dv_logging::{LogFormat, LogLevel, LoggingConfig};
use tempfile::TempDir;

#[test]
fn test_json_logging_to_configured_directory() {
    let temp_dir = TempDir::new().unwrap();
    let config = LoggingConfig {
        level: Some(LogLevel::Debug),
        format: Some(LogFormat::Json),
        log_dir: Some(temp_dir.path().join("logs").to_string_lossy().into_owned()),
        log_file: None,
    };

    config.init("file-logging").unwrap();
    tracing::warn!(directory_id = 7, "Dropping file outside the visible directories");

    let log_path = temp_dir.path().join("logs").join("file-logging.log");
    let contents = std::fs::read_to_string(&log_path).unwrap();
    let line = contents.lines().next().expect("one log line");
    let event: serde_json::Value = serde_json::from_str(line).unwrap();
    assert_eq!(event["level"], "WARN");
    assert_eq!(event["fields"]["directory_id"], 7);

    // A second global subscriber is refused
    assert!(
        dv_logging::init("file-logging", dv_logging::Level::INFO, LogFormat::Plaintext).is_err()
    );
}
