// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Top-level doc-vault configuration

use dv_logging::LoggingConfig;
use dv_tree_engine::EngineConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;

/// Configuration file layout
///
/// ```toml
/// [engine.name-matching]
/// draft-markers = ["draft", "wip"]
/// strip-version-suffix = true
///
/// [logging]
/// log-level = "debug"
/// log-format = "json"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub struct DocVaultConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl DocVaultConfig {
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// JSON schema of the configuration file
    pub fn json_schema() -> serde_json::Value {
        let schema = schemars::schema_for!(DocVaultConfig);
        serde_json::to_value(schema).unwrap_or_default()
    }

    pub fn init_logging(&self, component: &str) -> anyhow::Result<()> {
        self.logging.init(component)
    }
}
