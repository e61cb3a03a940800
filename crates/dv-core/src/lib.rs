// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Session state for the doc-vault browser and access editor
//!
//! The pure engine lives in `dv-tree-engine`. This crate owns one instance of
//! each engine component per editing session, runs the asynchronous calls
//! against a [`StorageClientApi`] and guards against stale responses.

pub mod access_editor;
pub mod browser;
pub mod client;
pub mod config;
pub mod error;
pub mod upload;

pub use access_editor::{AccessEditor, CommitTicket, LoadOutcome, LoadTicket};
pub use browser::{BrowseTicket, BrowserSession, DroppedFile};
pub use client::StorageClientApi;
pub use config::DocVaultConfig;
pub use error::{ClientApiError, ClientResult, CoreError, FailureKind, Result};
pub use upload::{PlannedUpload, UploadOutcome, UploadReport, upload_batch};
