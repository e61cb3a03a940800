// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Errors raised while decoding backend payloads

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DecodeError>;

/// A payload failed the validated decode step and never reaches the engine
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    #[error("Duplicate directory id: {0}")]
    DuplicateDirectory(u64),

    #[error("Duplicate file id: {0}")]
    DuplicateFile(u64),

    #[error("File {file_id} claims directory {claimed} but is listed under {listed_under}")]
    MisplacedFile {
        file_id: u64,
        claimed: u64,
        listed_under: u64,
    },

    #[error("File {0} has no directory id")]
    MissingDirectory(u64),

    #[error("Unexpected payload shape: {0}")]
    Shape(String),
}
