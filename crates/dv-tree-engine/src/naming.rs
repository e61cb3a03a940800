// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! File name normalization for conflict detection

use regex::Regex;

use crate::config::NameMatchingConfig;
use crate::error::{EngineError, Result};

fn version_suffix_regex() -> &'static Regex {
    static VERSION_REGEX: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    VERSION_REGEX.get_or_init(|| Regex::new(r"_v\d+$").expect("static version pattern"))
}

/// Reduces a file name to the form used for collision checks
///
/// `Drawing (draft).txt`, `Drawing(draft).txt` and `drawing.txt` all
/// normalize to `drawing.txt` with the default configuration.
#[derive(Debug, Clone)]
pub struct NameNormalizer {
    /// `None` when no draft markers are configured
    draft_marker: Option<Regex>,
    case_insensitive: bool,
    strip_version_suffix: bool,
}

impl NameNormalizer {
    pub fn new(config: &NameMatchingConfig) -> Result<Self> {
        let markers: Vec<String> = config
            .draft_markers
            .iter()
            .map(|marker| marker.trim())
            .filter(|marker| !marker.is_empty())
            .map(regex::escape)
            .collect();

        let draft_marker = if markers.is_empty() {
            None
        } else {
            let pattern = format!(r"(?i)\s*\(\s*(?:{})\s*\)\s*$", markers.join("|"));
            Some(Regex::new(&pattern).map_err(|e| {
                EngineError::Config(format!("invalid draft marker pattern: {e}"))
            })?)
        };

        Ok(Self {
            draft_marker,
            case_insensitive: config.case_insensitive,
            strip_version_suffix: config.strip_version_suffix,
        })
    }

    pub fn normalize(&self, name: &str) -> String {
        let name = name.trim();
        // A marker may also trail the extension: `plan.txt (draft)`
        let name = self.strip_draft_marker(name);
        let (stem, extension) = split_extension(name);

        let mut stem = self.strip_draft_marker(stem);
        if self.strip_version_suffix {
            if let Some(found) = version_suffix_regex().find(stem) {
                stem = &stem[..found.start()];
            }
        }

        let normalized = format!("{}{}", stem.trim_end(), extension);
        if self.case_insensitive {
            normalized.to_lowercase()
        } else {
            normalized
        }
    }

    /// Whether two names collide after normalization
    pub fn equivalent(&self, a: &str, b: &str) -> bool {
        self.normalize(a) == self.normalize(b)
    }

    fn strip_draft_marker<'a>(&self, name: &'a str) -> &'a str {
        match self.draft_marker.as_ref().and_then(|re| re.find(name)) {
            Some(found) => &name[..found.start()],
            None => name,
        }
    }
}

impl Default for NameNormalizer {
    fn default() -> Self {
        Self {
            draft_marker: Regex::new(r"(?i)\s*\(\s*(?:draft)\s*\)\s*$").ok(),
            case_insensitive: true,
            strip_version_suffix: false,
        }
    }
}

/// Split `name` into stem and extension (including the dot). Leading-dot
/// names such as `.env` have no extension.
fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(pos) if pos > 0 => name.split_at(pos),
        _ => (name, ""),
    }
}
