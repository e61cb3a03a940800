// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Domain types for the doc-vault file browser engine
//!
//! This crate holds the records delivered by the storage backend, the typed
//! node identifiers used as lookup keys, and the validated decode step that
//! turns wire payloads into records. It performs no I/O.

pub mod error;
pub mod ids;
pub mod records;
pub mod wire;

pub use error::{DecodeError, Result};
pub use ids::{NodeId, NodeKind, TreeScope};
pub use records::{AccessSet, DirectoryRecord, DirectoryStatus, FileRecord, FileStatus};
pub use wire::{
    AccessCommitPayload, DirectoryListing, UploadRequest, decode_access_snapshot,
    decode_directory_listing, decode_directory_listing_value, decode_file_listing,
};
