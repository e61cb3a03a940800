// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Engine configuration

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Tree engine configuration section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, schemars::JsonSchema, Default)]
#[serde(rename_all = "kebab-case")]
pub struct EngineConfig {
    /// How incoming upload names are matched against existing files
    #[serde(default)]
    pub name_matching: NameMatchingConfig,
}

/// Name normalization used by upload conflict detection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub struct NameMatchingConfig {
    /// Parenthesized markers that flag a not-yet-finalized file,
    /// e.g. `draft` matches `Drawing(draft).txt`
    #[serde(default = "default_draft_markers")]
    pub draft_markers: Vec<String>,

    /// Compare names case-insensitively
    #[serde(default = "default_true")]
    pub case_insensitive: bool,

    /// Also strip a trailing `_v<digits>` version marker from the stem
    #[serde(default)]
    pub strip_version_suffix: bool,
}

fn default_draft_markers() -> Vec<String> {
    vec!["draft".to_string()]
}

fn default_true() -> bool {
    true
}

impl Default for NameMatchingConfig {
    fn default() -> Self {
        Self {
            draft_markers: default_draft_markers(),
            case_insensitive: true,
            strip_version_suffix: false,
        }
    }
}

impl EngineConfig {
    /// Parse an engine section from TOML
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Extract the engine section from an already merged JSON configuration
    pub fn from_json_value(value: &serde_json::Value) -> Result<Self> {
        serde_json::from_value(value.clone())
            .map_err(|e| crate::EngineError::Config(e.to_string()))
    }
}
