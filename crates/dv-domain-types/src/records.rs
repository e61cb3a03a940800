// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Directory and file records as delivered by the storage backend
//!
//! Records are point-in-time snapshots. The engine never mutates them; a new
//! fetch replaces the whole list.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::ids::NodeId;

/// Lifecycle status of a directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DirectoryStatus {
    #[default]
    Active,
    Archived,
}

impl DirectoryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DirectoryStatus::Active => "active",
            DirectoryStatus::Archived => "archived",
        }
    }
}

impl std::str::FromStr for DirectoryStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(DirectoryStatus::Active),
            // The storage service spells it "archive"
            "archived" | "archive" => Ok(DirectoryStatus::Archived),
            _ => Err(format!("Invalid directory status: {}", s)),
        }
    }
}

impl fmt::Display for DirectoryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    #[default]
    Active,
    Archived,
    Draft,
}

impl FileStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileStatus::Active => "active",
            FileStatus::Archived => "archived",
            FileStatus::Draft => "draft",
        }
    }
}

impl std::str::FromStr for FileStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(FileStatus::Active),
            "archived" | "archive" => Ok(FileStatus::Archived),
            "draft" => Ok(FileStatus::Draft),
            _ => Err(format!("Invalid file status: {}", s)),
        }
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A directory visible to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryRecord {
    pub id: u64,
    pub name: String,
    /// `None` for a top-level directory. May reference a directory the
    /// caller cannot see.
    pub parent_id: Option<u64>,
    pub status: DirectoryStatus,
    pub access_granted: bool,
}

impl DirectoryRecord {
    pub fn new(id: u64, name: impl Into<String>, parent_id: Option<u64>) -> Self {
        Self {
            id,
            name: name.into(),
            parent_id,
            status: DirectoryStatus::Active,
            access_granted: false,
        }
    }

    pub fn with_status(mut self, status: DirectoryStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_access(mut self, granted: bool) -> Self {
        self.access_granted = granted;
        self
    }

    pub fn node_id(&self) -> NodeId {
        NodeId::Directory(self.id)
    }
}

/// A file stored inside a directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: u64,
    pub name: String,
    pub directory_id: u64,
    pub status: FileStatus,
    pub access_granted: bool,
}

impl FileRecord {
    pub fn new(id: u64, name: impl Into<String>, directory_id: u64) -> Self {
        Self {
            id,
            name: name.into(),
            directory_id,
            status: FileStatus::Active,
            access_granted: false,
        }
    }

    pub fn with_status(mut self, status: FileStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_access(mut self, granted: bool) -> Self {
        self.access_granted = granted;
        self
    }

    pub fn node_id(&self) -> NodeId {
        NodeId::File(self.id)
    }
}

/// Set of granted directory and file ids for one subject
///
/// Ordered sets keep diffs and commit payloads deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AccessSet {
    pub directory_ids: BTreeSet<u64>,
    pub file_ids: BTreeSet<u64>,
}

impl AccessSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_ids(
        directory_ids: impl IntoIterator<Item = u64>,
        file_ids: impl IntoIterator<Item = u64>,
    ) -> Self {
        Self {
            directory_ids: directory_ids.into_iter().collect(),
            file_ids: file_ids.into_iter().collect(),
        }
    }

    /// Snapshot of the `access_granted` flags carried by a per-subject listing
    pub fn from_records(directories: &[DirectoryRecord], files: &[FileRecord]) -> Self {
        Self {
            directory_ids: directories
                .iter()
                .filter(|dir| dir.access_granted)
                .map(|dir| dir.id)
                .collect(),
            file_ids: files.iter().filter(|file| file.access_granted).map(|file| file.id).collect(),
        }
    }

    /// Every id present in a listing, regardless of grant flags
    pub fn universe(directories: &[DirectoryRecord], files: &[FileRecord]) -> Self {
        Self::from_ids(
            directories.iter().map(|dir| dir.id),
            files.iter().map(|file| file.id),
        )
    }

    pub fn contains(&self, node: NodeId) -> bool {
        match node {
            NodeId::Directory(id) => self.directory_ids.contains(&id),
            NodeId::File(id) => self.file_ids.contains(&id),
        }
    }

    /// Add or remove `node`; returns whether the set changed
    pub fn set(&mut self, node: NodeId, granted: bool) -> bool {
        let ids = match node {
            NodeId::Directory(_) => &mut self.directory_ids,
            NodeId::File(_) => &mut self.file_ids,
        };
        if granted {
            ids.insert(node.raw())
        } else {
            ids.remove(&node.raw())
        }
    }

    pub fn is_subset(&self, other: &AccessSet) -> bool {
        self.directory_ids.is_subset(&other.directory_ids)
            && self.file_ids.is_subset(&other.file_ids)
    }

    /// Drop ids that are not present in `universe`, returning the dropped ones
    pub fn retain_known(&mut self, universe: &AccessSet) -> Vec<NodeId> {
        let mut dropped = Vec::new();
        self.directory_ids.retain(|id| {
            let keep = universe.directory_ids.contains(id);
            if !keep {
                dropped.push(NodeId::Directory(*id));
            }
            keep
        });
        self.file_ids.retain(|id| {
            let keep = universe.file_ids.contains(id);
            if !keep {
                dropped.push(NodeId::File(*id));
            }
            keep
        });
        dropped
    }

    pub fn len(&self) -> usize {
        self.directory_ids.len() + self.file_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directory_ids.is_empty() && self.file_ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parsing_accepts_backend_spelling() {
        assert_eq!("archive".parse::<DirectoryStatus>(), Ok(DirectoryStatus::Archived));
        assert_eq!("Archived".parse::<DirectoryStatus>(), Ok(DirectoryStatus::Archived));
        assert_eq!("draft".parse::<FileStatus>(), Ok(FileStatus::Draft));
        assert!("draft".parse::<DirectoryStatus>().is_err());
        assert!("deleted".parse::<FileStatus>().is_err());
    }

    #[test]
    fn test_access_set_from_records() {
        let dirs = vec![
            DirectoryRecord::new(1, "Root", None).with_access(true),
            DirectoryRecord::new(2, "Drawings", Some(1)),
        ];
        let files = vec![
            FileRecord::new(10, "plan.txt", 2).with_access(true),
            FileRecord::new(11, "notes.txt", 2),
        ];

        let set = AccessSet::from_records(&dirs, &files);
        assert_eq!(set, AccessSet::from_ids([1], [10]));

        let universe = AccessSet::universe(&dirs, &files);
        assert_eq!(universe, AccessSet::from_ids([1, 2], [10, 11]));
        assert!(set.is_subset(&universe));
    }

    #[test]
    fn test_access_set_set_reports_change() {
        let mut set = AccessSet::new();
        assert!(set.set(NodeId::Directory(3), true));
        assert!(!set.set(NodeId::Directory(3), true));
        assert!(set.contains(NodeId::Directory(3)));
        assert!(!set.contains(NodeId::File(3)));
        assert!(set.set(NodeId::Directory(3), false));
        assert!(set.is_empty());
    }

    #[test]
    fn test_retain_known_drops_foreign_ids() {
        let mut set = AccessSet::from_ids([1, 9], [10, 99]);
        let universe = AccessSet::from_ids([1, 2], [10]);

        let dropped = set.retain_known(&universe);
        assert_eq!(dropped, vec![NodeId::Directory(9), NodeId::File(99)]);
        assert_eq!(set, AccessSet::from_ids([1], [10]));
    }
}
