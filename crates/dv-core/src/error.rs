// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Error types for session owners and the storage collaborator

use dv_domain_types::DecodeError;
use dv_tree_engine::EngineError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CoreError>;

pub type ClientResult<T> = std::result::Result<T, ClientApiError>;

/// Coarse failure category callers match on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureKind {
    /// The request never got a response
    Network,
    Unauthorized,
    NotFound,
    /// The backend answered with any other error status
    Rejected,
    /// The response could not be decoded into records
    Malformed,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureKind::Network => write!(f, "network"),
            FailureKind::Unauthorized => write!(f, "unauthorized"),
            FailureKind::NotFound => write!(f, "not-found"),
            FailureKind::Rejected => write!(f, "rejected"),
            FailureKind::Malformed => write!(f, "malformed"),
        }
    }
}

/// Transport failures reported by a [`crate::StorageClientApi`]
#[derive(Debug, Error)]
pub enum ClientApiError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request failed with status {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Malformed response: {0}")]
    Decode(#[from] DecodeError),
}

impl ClientApiError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ClientApiError::Network(_) => FailureKind::Network,
            ClientApiError::Http { status: 401 | 403, .. } => FailureKind::Unauthorized,
            ClientApiError::Http { status: 404, .. } => FailureKind::NotFound,
            ClientApiError::Http { .. } => FailureKind::Rejected,
            ClientApiError::Decode(_) => FailureKind::Malformed,
        }
    }
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Client(#[from] ClientApiError),

    #[error("No subject is selected for access editing")]
    NoSubject,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// Stale ids are a data-freshness bug, reported apart from transport
    /// failures
    pub fn is_stale_target(&self) -> bool {
        matches!(self, CoreError::Engine(e) if e.is_stale_target())
    }

    /// Failure category for transport errors, `None` otherwise
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            CoreError::Client(e) => Some(e.kind()),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for CoreError {
    fn from(error: toml::de::Error) -> Self {
        CoreError::Config(error.to_string())
    }
}
