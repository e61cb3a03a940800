// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Flat record list to forest materialization
//!
//! Partial visibility is expected: a caller usually sees only part of the
//! directory hierarchy. Files whose directory is missing are dropped,
//! directories whose parent is missing become roots. None of this is an
//! error; it is collected in a [`VisibilityReport`] instead.

use dv_domain_types::{DirectoryRecord, FileRecord, NodeId};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

use crate::node::TreeNode;
use crate::virtual_root::mark_virtual_roots;

/// What the caller could not see in the last snapshot
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VisibilityReport {
    /// Root directories whose parent exists but is not visible
    pub virtual_roots: Vec<u64>,
    /// Files whose directory is not in the listing
    pub orphaned_files: Vec<u64>,
    /// Directories caught in a parent cycle, never reachable from a root
    pub unreachable_directories: Vec<u64>,
}

impl VisibilityReport {
    /// Whether the partial-visibility banner should be shown
    pub fn is_partial(&self) -> bool {
        !self.virtual_roots.is_empty()
            || !self.orphaned_files.is_empty()
            || !self.unreachable_directories.is_empty()
    }
}

/// Build the forest for a directory and file listing.
///
/// Each record appears at most once in the output. Output order follows input
/// order, so the same input always yields the same forest. Runs in
/// O(directories + files).
pub fn build(directories: &[DirectoryRecord], files: &[FileRecord]) -> Vec<TreeNode> {
    assemble(directories, files).0
}

fn assemble(
    directories: &[DirectoryRecord],
    files: &[FileRecord],
) -> (Vec<TreeNode>, VisibilityReport) {
    let mut report = VisibilityReport::default();

    // First pass: one bare node per directory id, first occurrence wins
    let mut index: HashMap<u64, usize> = HashMap::with_capacity(directories.len());
    let mut nodes: Vec<Option<TreeNode>> = Vec::with_capacity(directories.len());
    for (pos, dir) in directories.iter().enumerate() {
        if index.contains_key(&dir.id) {
            warn!(directory_id = dir.id, "Ignoring duplicate directory record");
            nodes.push(None);
            continue;
        }
        index.insert(dir.id, pos);
        nodes.push(Some(TreeNode::directory(dir)));
    }

    // Second pass: files go under their owning directory
    let mut seen_files = HashSet::with_capacity(files.len());
    for file in files {
        if !seen_files.insert(file.id) {
            warn!(file_id = file.id, "Ignoring duplicate file record");
            continue;
        }
        match index.get(&file.directory_id).and_then(|&pos| nodes[pos].as_mut()) {
            Some(owner) => owner.children.push(TreeNode::file(file)),
            None => {
                debug!(
                    file_id = file.id,
                    directory_id = file.directory_id,
                    "Dropping file outside the visible directories"
                );
                report.orphaned_files.push(file.id);
            }
        }
    }

    // Third pass: link directories to visible parents
    let mut parent_of: Vec<Option<usize>> = vec![None; directories.len()];
    let mut child_dirs: Vec<Vec<usize>> = vec![Vec::new(); directories.len()];
    let mut roots = Vec::new();
    for (pos, dir) in directories.iter().enumerate() {
        if nodes[pos].is_none() {
            continue;
        }
        // A self-reference is treated as "no parent available"
        let parent = dir
            .parent_id
            .filter(|&parent_id| parent_id != dir.id)
            .and_then(|parent_id| index.get(&parent_id).copied());
        match parent {
            Some(parent_pos) => {
                parent_of[pos] = Some(parent_pos);
                child_dirs[parent_pos].push(pos);
            }
            None => roots.push(pos),
        }
    }

    // Pre-order from the roots; anything not reached sits on a cycle
    let mut order = Vec::with_capacity(directories.len());
    let mut stack: Vec<usize> = roots.iter().rev().copied().collect();
    while let Some(pos) = stack.pop() {
        order.push(pos);
        stack.extend(child_dirs[pos].iter().rev());
    }

    // Reverse pre-order finishes every child before its parent
    let mut finished: Vec<Vec<TreeNode>> = vec![Vec::new(); directories.len()];
    let mut forest = Vec::with_capacity(roots.len());
    for &pos in order.iter().rev() {
        let Some(mut node) = nodes[pos].take() else {
            continue;
        };
        let mut subdirs = std::mem::take(&mut finished[pos]);
        subdirs.reverse();
        node.children.extend(subdirs);
        match parent_of[pos] {
            Some(parent_pos) => finished[parent_pos].push(node),
            None => forest.push(node),
        }
    }
    forest.reverse();

    for (pos, leftover) in nodes.iter().enumerate() {
        if leftover.is_some() {
            let id = directories[pos].id;
            warn!(directory_id = id, "Directory is part of a parent cycle, not rendered");
            report.unreachable_directories.push(id);
        }
    }

    (forest, report)
}

/// Materialized forest for one snapshot, with virtual roots flagged
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Forest {
    pub roots: Vec<TreeNode>,
    pub report: VisibilityReport,
}

impl Forest {
    /// Build the forest, flag virtual roots and record what was not visible
    pub fn materialize(directories: &[DirectoryRecord], files: &[FileRecord]) -> Self {
        let (mut roots, mut report) = assemble(directories, files);
        report.virtual_roots = mark_virtual_roots(directories, &mut roots);
        debug!(
            roots = roots.len(),
            virtual_roots = report.virtual_roots.len(),
            orphaned_files = report.orphaned_files.len(),
            "Materialized forest"
        );
        Self { roots, report }
    }

    pub fn find(&self, id: NodeId) -> Option<&TreeNode> {
        self.roots.iter().find_map(|root| root.find(id))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.find(id).is_some()
    }

    /// Directories expanded when the tree is first shown
    pub fn root_directory_ids(&self) -> Vec<u64> {
        self.roots.iter().filter(|root| root.is_directory()).map(|root| root.id.raw()).collect()
    }

    pub fn directory_ids(&self) -> Vec<u64> {
        self.collect_ids(|id| id.is_directory())
    }

    pub fn file_ids(&self) -> Vec<u64> {
        self.collect_ids(|id| id.is_file())
    }

    fn collect_ids(&self, keep: impl Fn(&NodeId) -> bool) -> Vec<u64> {
        let mut ids = Vec::new();
        for root in &self.roots {
            root.walk(&mut |node| {
                if keep(&node.id) {
                    ids.push(node.id.raw());
                }
            });
        }
        ids
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}
