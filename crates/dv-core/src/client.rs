// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Storage backend collaborator
//!
//! The engine never talks to the network itself. Implementations of
//! [`StorageClientApi`] run the requests and hand back decoded records, so
//! malformed payloads are rejected before they reach the tree builder.

use async_trait::async_trait;
use dv_domain_types::{AccessCommitPayload, DirectoryListing, TreeScope, UploadRequest};

use crate::error::ClientResult;

#[async_trait]
pub trait StorageClientApi: Send + Sync {
    /// Directories and files visible to the caller in one storage pane
    async fn list_directories(&self, scope: TreeScope) -> ClientResult<DirectoryListing>;

    /// Full tree for the access editor, with grant flags for `subject_id`
    async fn list_subject_tree(&self, subject_id: u64) -> ClientResult<DirectoryListing>;

    /// Replace every grant of `subject_id` with `payload`
    async fn replace_access(
        &self,
        subject_id: u64,
        payload: &AccessCommitPayload,
    ) -> ClientResult<()>;

    /// Create a file, or supersede `request.replaces` when set
    async fn upload_file(&self, request: &UploadRequest) -> ClientResult<()>;
}
