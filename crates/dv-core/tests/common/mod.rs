// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! In-memory storage backend shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use dv_core::{ClientApiError, ClientResult, StorageClientApi};
use dv_domain_types::{
    AccessCommitPayload, DirectoryListing, FileRecord, TreeScope, UploadRequest,
    decode_directory_listing,
};
use std::collections::{HashMap, HashSet};
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct FakeState {
    active: DirectoryListing,
    archived: DirectoryListing,
    subjects: HashMap<u64, DirectoryListing>,
    commits: Vec<(u64, AccessCommitPayload)>,
    uploads: Vec<UploadRequest>,
    rejected_upload: Option<String>,
    listing_status: Option<u16>,
    commit_status: Option<u16>,
    next_file_id: u64,
    subject_fetches: usize,
}

/// Decodes its fixtures through the wire layer, like a real client would
#[derive(Debug)]
pub struct FakeStorageClient {
    state: Mutex<FakeState>,
}

impl FakeStorageClient {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(FakeState {
                next_file_id: 1000,
                ..Default::default()
            }),
        }
    }

    pub async fn with_listing(self, scope: TreeScope, json: &str) -> Self {
        let listing = decode_directory_listing(json).expect("fixture listing decodes");
        {
            let mut state = self.state.lock().await;
            match scope {
                TreeScope::Active => state.active = listing,
                TreeScope::Archived => state.archived = listing,
            }
        }
        self
    }

    pub async fn with_subject(self, subject_id: u64, json: &str) -> Self {
        let listing = decode_directory_listing(json).expect("fixture listing decodes");
        self.state.lock().await.subjects.insert(subject_id, listing);
        self
    }

    pub async fn reject_upload_of(&self, name: &str) {
        self.state.lock().await.rejected_upload = Some(name.to_string());
    }

    pub async fn fail_listings_with(&self, status: u16) {
        self.state.lock().await.listing_status = Some(status);
    }

    pub async fn fail_commits_with(&self, status: u16) {
        self.state.lock().await.commit_status = Some(status);
    }

    pub async fn remove_active_file(&self, file_id: u64) {
        self.state.lock().await.active.files.retain(|file| file.id != file_id);
    }

    pub async fn commits(&self) -> Vec<(u64, AccessCommitPayload)> {
        self.state.lock().await.commits.clone()
    }

    pub async fn subject_fetches(&self) -> usize {
        self.state.lock().await.subject_fetches
    }

    pub async fn uploads(&self) -> Vec<UploadRequest> {
        self.state.lock().await.uploads.clone()
    }
}

#[async_trait]
impl StorageClientApi for FakeStorageClient {
    async fn list_directories(&self, scope: TreeScope) -> ClientResult<DirectoryListing> {
        let state = self.state.lock().await;
        if let Some(status) = state.listing_status {
            return Err(ClientApiError::Http {
                status,
                message: "listing failed".to_string(),
            });
        }
        Ok(match scope {
            TreeScope::Active => state.active.clone(),
            TreeScope::Archived => state.archived.clone(),
        })
    }

    async fn list_subject_tree(&self, subject_id: u64) -> ClientResult<DirectoryListing> {
        let mut state = self.state.lock().await;
        state.subject_fetches += 1;
        if let Some(status) = state.listing_status {
            return Err(ClientApiError::Http {
                status,
                message: "listing failed".to_string(),
            });
        }
        state.subjects.get(&subject_id).cloned().ok_or_else(|| ClientApiError::Http {
            status: 404,
            message: format!("unknown subject {subject_id}"),
        })
    }

    async fn replace_access(
        &self,
        subject_id: u64,
        payload: &AccessCommitPayload,
    ) -> ClientResult<()> {
        let mut state = self.state.lock().await;
        if let Some(status) = state.commit_status {
            return Err(ClientApiError::Http {
                status,
                message: "commit failed".to_string(),
            });
        }
        let directories: HashSet<u64> = payload.directory_ids.iter().copied().collect();
        let files: HashSet<u64> = payload.file_ids.iter().copied().collect();
        if let Some(listing) = state.subjects.get_mut(&subject_id) {
            for dir in &mut listing.directories {
                dir.access_granted = directories.contains(&dir.id);
            }
            for file in &mut listing.files {
                file.access_granted = files.contains(&file.id);
            }
        }
        state.commits.push((subject_id, payload.clone()));
        Ok(())
    }

    async fn upload_file(&self, request: &UploadRequest) -> ClientResult<()> {
        let mut state = self.state.lock().await;
        if state.rejected_upload.as_deref() == Some(request.name.as_str()) {
            return Err(ClientApiError::Http {
                status: 413,
                message: "too large".to_string(),
            });
        }
        if let Some(replaced) = request.replaces {
            state.active.files.retain(|file| file.id != replaced);
        }
        let id = state.next_file_id;
        state.next_file_id += 1;
        state.active.files.push(FileRecord::new(id, request.name.clone(), request.directory_id));
        state.uploads.push(request.clone());
        Ok(())
    }
}
