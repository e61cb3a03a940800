// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Wire DTOs and the validated decode step
//!
//! The storage service returns directory listings in a few shapes: bare or
//! wrapped in a `data` envelope, with files embedded per directory or as a
//! separate flat list. Field names follow the service (`name_folder`,
//! `parent_path_id`, `user_has_access`, ...). Everything is decoded into
//! [`DirectoryRecord`] / [`FileRecord`] here, and malformed payloads are
//! rejected before they reach the tree engine.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use tracing::debug;
use validator::Validate;

use crate::error::{DecodeError, Result};
use crate::records::{AccessSet, DirectoryRecord, DirectoryStatus, FileRecord, FileStatus};

/// Directory entry as sent by the storage service
#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
pub struct DirectoryDto {
    #[serde(alias = "directory_id")]
    pub id: u64,
    #[serde(alias = "name")]
    #[validate(length(min = 1))]
    pub name_folder: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, alias = "parentId", alias = "parent_id")]
    pub parent_path_id: Option<u64>,
    #[serde(default, alias = "accessGranted")]
    pub user_has_access: bool,
    #[serde(default)]
    #[validate(nested)]
    pub files: Vec<FileDto>,
}

/// File entry as sent by the storage service
#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
pub struct FileDto {
    pub id: u64,
    #[serde(alias = "name")]
    #[validate(length(min = 1))]
    pub name_file: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, alias = "directoryId")]
    pub directory_id: Option<u64>,
    #[serde(default, alias = "accessGranted")]
    pub user_has_access: bool,
}

/// Decoded directory listing
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DirectoryListing {
    pub directories: Vec<DirectoryRecord>,
    pub files: Vec<FileRecord>,
}

impl DirectoryListing {
    pub fn new(directories: Vec<DirectoryRecord>, files: Vec<FileRecord>) -> Self {
        Self { directories, files }
    }

    /// Merge a separately fetched flat file listing
    pub fn with_files(mut self, files: Vec<FileRecord>) -> Result<Self> {
        let mut seen: HashSet<u64> = self.files.iter().map(|file| file.id).collect();
        for file in &files {
            if !seen.insert(file.id) {
                return Err(DecodeError::DuplicateFile(file.id));
            }
        }
        self.files.extend(files);
        Ok(self)
    }

    /// Grant snapshot carried by a per-subject listing
    pub fn access_snapshot(&self) -> AccessSet {
        AccessSet::from_records(&self.directories, &self.files)
    }

    pub fn is_empty(&self) -> bool {
        self.directories.is_empty() && self.files.is_empty()
    }
}

/// Access snapshot for a subject, as sent by the backend
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AccessSnapshotDto {
    #[serde(default, alias = "directoryIds")]
    pub directory_ids: Vec<u64>,
    #[serde(default, alias = "fileIds")]
    pub file_ids: Vec<u64>,
}

/// Body of the access commit request. The backend replaces the subject's
/// grants with exactly this set.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AccessCommitPayload {
    pub directory_ids: Vec<u64>,
    pub file_ids: Vec<u64>,
}

impl From<&AccessSet> for AccessCommitPayload {
    fn from(set: &AccessSet) -> Self {
        Self {
            directory_ids: set.directory_ids.iter().copied().collect(),
            file_ids: set.file_ids.iter().copied().collect(),
        }
    }
}

/// One accepted file of an upload batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub directory_id: u64,
    pub name: String,
    pub content: Vec<u8>,
    /// Existing file superseded by this upload, if the user confirmed a replace
    pub replaces: Option<u64>,
}

impl UploadRequest {
    /// Non-binary multipart fields; the content goes into the `file` part
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("directoryId", self.directory_id.to_string()),
            ("name", self.name.clone()),
        ]
    }
}

/// Strip an optional `{"data": ...}` envelope
fn unwrap_envelope(value: Value) -> Result<Vec<Value>> {
    match value {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(items)) => Ok(items),
            Some(other) => Err(DecodeError::Shape(format!(
                "expected an array under \"data\", found {}",
                json_kind(&other)
            ))),
            None => Err(DecodeError::Shape("object without a \"data\" array".to_string())),
        },
        other => Err(DecodeError::Shape(format!(
            "expected an array or an object, found {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn directory_status(raw: Option<&str>) -> Result<DirectoryStatus> {
    match raw {
        None => Ok(DirectoryStatus::default()),
        Some(s) => s.parse().map_err(DecodeError::InvalidStatus),
    }
}

fn file_status(raw: Option<&str>) -> Result<FileStatus> {
    match raw {
        None => Ok(FileStatus::default()),
        Some(s) => s.parse().map_err(DecodeError::InvalidStatus),
    }
}

fn file_record(dto: &FileDto, listed_under: Option<u64>) -> Result<FileRecord> {
    let directory_id = match (dto.directory_id, listed_under) {
        (Some(claimed), Some(listed)) if claimed != listed => {
            return Err(DecodeError::MisplacedFile {
                file_id: dto.id,
                claimed,
                listed_under: listed,
            });
        }
        (Some(id), _) | (None, Some(id)) => id,
        (None, None) => return Err(DecodeError::MissingDirectory(dto.id)),
    };

    Ok(FileRecord {
        id: dto.id,
        name: dto.name_file.clone(),
        directory_id,
        status: file_status(dto.status.as_deref())?,
        access_granted: dto.user_has_access,
    })
}

/// Decode a directory listing from an already parsed JSON value
pub fn decode_directory_listing_value(value: Value) -> Result<DirectoryListing> {
    let items = unwrap_envelope(value)?;
    let mut listing = DirectoryListing::default();
    let mut dir_ids = HashSet::new();
    let mut file_ids = HashSet::new();

    for item in items {
        let dto: DirectoryDto = serde_json::from_value(item)?;
        dto.validate()?;

        if !dir_ids.insert(dto.id) {
            return Err(DecodeError::DuplicateDirectory(dto.id));
        }

        for file in &dto.files {
            if !file_ids.insert(file.id) {
                return Err(DecodeError::DuplicateFile(file.id));
            }
            listing.files.push(file_record(file, Some(dto.id))?);
        }

        listing.directories.push(DirectoryRecord {
            id: dto.id,
            name: dto.name_folder,
            parent_id: dto.parent_path_id,
            status: directory_status(dto.status.as_deref())?,
            access_granted: dto.user_has_access,
        });
    }

    debug!(
        directories = listing.directories.len(),
        files = listing.files.len(),
        "Decoded directory listing"
    );
    Ok(listing)
}

/// Decode a directory listing, bare or under a `data` envelope
pub fn decode_directory_listing(json: &str) -> Result<DirectoryListing> {
    decode_directory_listing_value(serde_json::from_str(json)?)
}

/// Decode a flat file listing; every entry must carry its `directory_id`
pub fn decode_file_listing(json: &str) -> Result<Vec<FileRecord>> {
    let items = unwrap_envelope(serde_json::from_str(json)?)?;
    let mut seen = HashSet::new();
    let mut files = Vec::with_capacity(items.len());

    for item in items {
        let dto: FileDto = serde_json::from_value(item)?;
        dto.validate()?;
        if !seen.insert(dto.id) {
            return Err(DecodeError::DuplicateFile(dto.id));
        }
        files.push(file_record(&dto, None)?);
    }

    debug!(files = files.len(), "Decoded flat file listing");
    Ok(files)
}

/// Decode a subject's access snapshot
pub fn decode_access_snapshot(json: &str) -> Result<AccessSet> {
    let dto: AccessSnapshotDto = serde_json::from_str(json)?;
    Ok(AccessSet::from_ids(dto.directory_ids, dto.file_ids))
}
