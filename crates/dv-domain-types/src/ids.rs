// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Typed identifiers for tree nodes
//!
//! Directories and files live in separate id spaces on the backend. A
//! [`NodeId`] tags the raw integer with its kind so both spaces can share one
//! lookup table. The `dir-<id>` / `file-<id>` string form only exists at the
//! presentation boundary (see the `Display` and `FromStr` impls).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which id space a node belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Directory,
    File,
}

impl NodeKind {
    fn key_prefix(self) -> &'static str {
        match self {
            NodeKind::Directory => "dir",
            NodeKind::File => "file",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Directory => write!(f, "directory"),
            NodeKind::File => write!(f, "file"),
        }
    }
}

/// Tagged node identifier, unique across directories and files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum NodeId {
    Directory(u64),
    File(u64),
}

impl NodeId {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeId::Directory(_) => NodeKind::Directory,
            NodeId::File(_) => NodeKind::File,
        }
    }

    /// Raw backend id, without the kind tag
    pub fn raw(&self) -> u64 {
        match *self {
            NodeId::Directory(id) | NodeId::File(id) => id,
        }
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, NodeId::Directory(_))
    }

    pub fn is_file(&self) -> bool {
        matches!(self, NodeId::File(_))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.kind().key_prefix(), self.raw())
    }
}

impl std::str::FromStr for NodeId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (prefix, raw) = s
            .split_once('-')
            .ok_or_else(|| format!("Invalid node key: {}", s))?;
        let id = raw.parse::<u64>().map_err(|_| format!("Invalid node id in key: {}", s))?;
        match prefix {
            "dir" => Ok(NodeId::Directory(id)),
            "file" => Ok(NodeId::File(id)),
            _ => Err(format!(
                "Invalid node key prefix: {}. Use 'dir' or 'file'",
                prefix
            )),
        }
    }
}

/// Which of the two storage panes a tree was loaded from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TreeScope {
    #[default]
    Active,
    Archived,
}

impl TreeScope {
    /// Value of the backend's `is_archive` listing flag
    pub fn is_archive(self) -> bool {
        matches!(self, TreeScope::Archived)
    }
}

impl fmt::Display for TreeScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeScope::Active => write!(f, "active"),
            TreeScope::Archived => write!(f, "archived"),
        }
    }
}
