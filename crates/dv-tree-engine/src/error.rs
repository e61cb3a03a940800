// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Error types for the tree engine

use dv_domain_types::NodeId;
use thiserror::Error;

use crate::selection::MenuAction;

pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors reported at the engine boundary
///
/// Missing parents and orphaned files are not errors: the builder degrades
/// gracefully and reports them through `VisibilityReport` instead.
#[derive(Debug, Error, PartialEq)]
pub enum EngineError {
    #[error("{0} is not present in the loaded snapshot")]
    UnknownNode(NodeId),

    #[error("{0} is not a directory")]
    NotADirectory(NodeId),

    #[error("{action} is not available for {target}")]
    ActionUnavailable { action: MenuAction, target: NodeId },

    #[error("context menu is closed")]
    MenuClosed,

    #[error("Configuration error: {0}")]
    Config(String),
}

impl EngineError {
    /// The caller referenced an id that is no longer in the current snapshot.
    /// Surfaced as a hard validation error, distinct from transport failures.
    pub fn is_stale_target(&self) -> bool {
        matches!(self, EngineError::UnknownNode(_))
    }
}

impl From<toml::de::Error> for EngineError {
    fn from(error: toml::de::Error) -> Self {
        EngineError::Config(error.to_string())
    }
}
