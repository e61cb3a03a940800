// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Logging configuration section

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::{LogFormat, LogLevel, get_standard_log_path_for_component, init, init_to_file};

/// Logging configuration
///
/// Logs go to stdout unless `log-file` or `log-dir` is set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub struct LoggingConfig {
    /// Logging verbosity level
    #[serde(rename = "log-level", skip_serializing_if = "Option::is_none")]
    pub level: Option<LogLevel>,

    /// Output format
    #[serde(rename = "log-format", skip_serializing_if = "Option::is_none")]
    pub format: Option<LogFormat>,

    /// Directory for log files
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<String>,

    /// Log filename, or a full path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<String>,
}

impl LoggingConfig {
    /// Install the global subscriber described by this section
    pub fn init(&self, component: &str) -> anyhow::Result<()> {
        let level = self.level.unwrap_or_default().into();
        let format = self.format.unwrap_or_default();

        if self.logs_to_file() {
            let log_path = self.resolve_log_path(component);
            init_to_file(component, level, format, &log_path)
        } else {
            init(component, level, format)
        }
    }

    pub fn logs_to_file(&self) -> bool {
        self.log_file.is_some() || self.log_dir.is_some()
    }

    /// Resolve the log file path
    ///
    /// 1. An absolute `log-file` is used as is
    /// 2. A relative `log-file` is placed under `log-dir` when set
    /// 3. Without `log-file`, `<log-dir>/<component>.log`
    /// 4. Otherwise the platform standard location
    pub fn resolve_log_path(&self, component: &str) -> PathBuf {
        match (&self.log_file, &self.log_dir) {
            (Some(log_file), _) if Path::new(log_file).is_absolute() => PathBuf::from(log_file),
            (Some(log_file), Some(log_dir)) => Path::new(log_dir).join(log_file),
            (Some(log_file), None) => PathBuf::from(log_file),
            (None, Some(log_dir)) => Path::new(log_dir).join(format!("{}.log", component)),
            (None, None) => get_standard_log_path_for_component(component),
        }
    }
}
