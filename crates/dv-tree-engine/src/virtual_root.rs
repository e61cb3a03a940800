// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Virtual root detection
//!
//! A forest root is a virtual root when its directory has a parent that the
//! caller cannot see. The presentation layer flags these so a truncated tree
//! is not mistaken for a flat one. Siblings under the same invisible parent
//! are flagged independently; no synthetic ancestor is created.

use dv_domain_types::{DirectoryRecord, NodeId};
use std::collections::{HashMap, HashSet};
use tracing::trace;

use crate::node::TreeNode;

/// Set `is_virtual_root` on each forest root and return the flagged ids in
/// forest order. Non-root nodes are left untouched.
pub fn mark_virtual_roots(
    directories: &[DirectoryRecord],
    forest_roots: &mut [TreeNode],
) -> Vec<u64> {
    let visible: HashSet<u64> = directories.iter().map(|dir| dir.id).collect();
    let mut parents: HashMap<u64, Option<u64>> = HashMap::with_capacity(directories.len());
    for dir in directories {
        parents.entry(dir.id).or_insert(dir.parent_id);
    }

    let mut flagged = Vec::new();
    for root in forest_roots.iter_mut() {
        let NodeId::Directory(id) = root.id else {
            root.is_virtual_root = false;
            continue;
        };
        let parent = parents.get(&id).copied().flatten();
        root.is_virtual_root = matches!(parent, Some(parent_id) if !visible.contains(&parent_id));
        if root.is_virtual_root {
            trace!(directory_id = id, parent_id = ?parent, "Marked virtual root");
            flagged.push(id);
        }
    }
    flagged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build;

    #[test]
    fn test_null_parent_is_a_true_root() {
        let dirs = vec![DirectoryRecord::new(1, "Root", None)];
        let mut forest = build(&dirs, &[]);
        assert!(mark_virtual_roots(&dirs, &mut forest).is_empty());
        assert!(!forest[0].is_virtual_root);
    }

    #[test]
    fn test_siblings_under_invisible_parent_flagged_independently() {
        let dirs = vec![
            DirectoryRecord::new(5, "A", Some(3)),
            DirectoryRecord::new(6, "B", Some(3)),
            DirectoryRecord::new(7, "C", Some(5)),
        ];
        let mut forest = build(&dirs, &[]);
        assert_eq!(forest.len(), 2);

        let flagged = mark_virtual_roots(&dirs, &mut forest);
        assert_eq!(flagged, vec![5, 6]);
        assert!(forest.iter().all(|root| root.is_virtual_root));
        // The nested child has a visible parent and stays unflagged
        assert!(!forest[0].children[0].is_virtual_root);
    }

    #[test]
    fn test_marking_is_recomputed_not_sticky() {
        let dirs = vec![DirectoryRecord::new(1, "Root", None)];
        let mut forest = build(&dirs, &[]);
        forest[0].is_virtual_root = true;
        mark_virtual_roots(&dirs, &mut forest);
        assert!(!forest[0].is_virtual_root);
    }
}
