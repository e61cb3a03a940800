// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Renderable tree nodes

use dv_domain_types::{DirectoryRecord, FileRecord, NodeId, NodeKind};
use serde::{Deserialize, Serialize};

/// One node of a materialized forest
///
/// A file node never has children. A directory node lists its files first,
/// then its visible child directories, both in input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    pub id: NodeId,
    pub label: String,
    pub status: String,
    pub is_virtual_root: bool,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn directory(record: &DirectoryRecord) -> Self {
        Self {
            id: record.node_id(),
            label: record.name.clone(),
            status: record.status.as_str().to_string(),
            is_virtual_root: false,
            children: Vec::new(),
        }
    }

    pub fn file(record: &FileRecord) -> Self {
        Self {
            id: record.node_id(),
            label: record.name.clone(),
            status: record.status.as_str().to_string(),
            is_virtual_root: false,
            children: Vec::new(),
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.id.kind()
    }

    /// Presentation key, `dir-<id>` or `file-<id>`
    pub fn key(&self) -> String {
        self.id.to_string()
    }

    pub fn is_directory(&self) -> bool {
        self.id.is_directory()
    }

    /// File children only
    pub fn files(&self) -> impl Iterator<Item = &TreeNode> {
        self.children.iter().filter(|child| child.id.is_file())
    }

    /// Directory children only
    pub fn subdirectories(&self) -> impl Iterator<Item = &TreeNode> {
        self.children.iter().filter(|child| child.id.is_directory())
    }

    /// Depth-first search of this subtree
    pub fn find(&self, id: NodeId) -> Option<&TreeNode> {
        if self.id == id {
            return Some(self);
        }
        if id.is_file() && self.id.is_file() {
            return None;
        }
        self.children.iter().find_map(|child| child.find(id))
    }

    /// Pre-order walk over this subtree
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a TreeNode)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }
}
