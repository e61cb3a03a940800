// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Pending versus committed access grants
//!
//! The engine keeps two independent [`AccessSet`]s for one subject:
//! `original` (last committed) and `pending` (edits in progress). Toggles
//! only touch `pending`. The diff is always recomputed from the two sets, so
//! no edit history is kept.

use dv_domain_types::{AccessCommitPayload, AccessSet, DirectoryRecord, FileRecord, NodeId};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::error::{EngineError, Result};

/// Added/removed ids per dimension, each sorted ascending
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AccessDiff {
    pub added_directory_ids: Vec<u64>,
    pub removed_directory_ids: Vec<u64>,
    pub added_file_ids: Vec<u64>,
    pub removed_file_ids: Vec<u64>,
}

impl AccessDiff {
    pub fn is_empty(&self) -> bool {
        self.added_directory_ids.is_empty()
            && self.removed_directory_ids.is_empty()
            && self.added_file_ids.is_empty()
            && self.removed_file_ids.is_empty()
    }

    /// Number of changed grants, shown on the unsaved-changes banner
    pub fn change_count(&self) -> usize {
        self.added_directory_ids.len()
            + self.removed_directory_ids.len()
            + self.added_file_ids.len()
            + self.removed_file_ids.len()
    }
}

#[derive(Debug, Clone, Default)]
pub struct AccessDiffEngine {
    /// Every id present in the loaded listing
    known: AccessSet,
    original: AccessSet,
    pending: AccessSet,
}

impl AccessDiffEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine for a per-subject listing, seeded from its grant flags
    pub fn from_records(directories: &[DirectoryRecord], files: &[FileRecord]) -> Self {
        let mut engine = Self::new();
        engine.initialize(
            &AccessSet::from_records(directories, files),
            AccessSet::universe(directories, files),
        );
        engine
    }

    /// Reset both sets to independent copies of `snapshot`.
    ///
    /// `known` is the id universe of the loaded listing. Snapshot ids outside
    /// it are dropped so both sets stay subsets of what is loaded.
    pub fn initialize(&mut self, snapshot: &AccessSet, known: AccessSet) {
        let mut original = snapshot.clone();
        let dropped = original.retain_known(&known);
        if !dropped.is_empty() {
            warn!(?dropped, "Access snapshot references ids outside the loaded listing");
        }
        self.known = known;
        self.pending = original.clone();
        self.original = original;
        debug!(
            directories = self.original.directory_ids.len(),
            files = self.original.file_ids.len(),
            "Initialized access snapshot"
        );
    }

    pub fn toggle_directory(&mut self, id: u64, granted: bool) -> Result<()> {
        self.toggle(NodeId::Directory(id), granted)
    }

    pub fn toggle_file(&mut self, id: u64, granted: bool) -> Result<()> {
        self.toggle(NodeId::File(id), granted)
    }

    /// Grant or revoke `node` in `pending`. Ids outside the loaded listing
    /// are rejected and leave the state unchanged.
    pub fn toggle(&mut self, node: NodeId, granted: bool) -> Result<()> {
        if !self.known.contains(node) {
            return Err(EngineError::UnknownNode(node));
        }
        let changed = self.pending.set(node, granted);
        trace!(%node, granted, changed, "Toggled access");
        Ok(())
    }

    pub fn is_dirty(&self) -> bool {
        self.pending != self.original
    }

    pub fn diff(&self) -> AccessDiff {
        AccessDiff {
            added_directory_ids: self
                .pending
                .directory_ids
                .difference(&self.original.directory_ids)
                .copied()
                .collect(),
            removed_directory_ids: self
                .original
                .directory_ids
                .difference(&self.pending.directory_ids)
                .copied()
                .collect(),
            added_file_ids: self
                .pending
                .file_ids
                .difference(&self.original.file_ids)
                .copied()
                .collect(),
            removed_file_ids: self
                .original
                .file_ids
                .difference(&self.pending.file_ids)
                .copied()
                .collect(),
        }
    }

    /// Promote `pending` to `original` after the backend confirmed the save
    pub fn commit(&mut self) {
        self.original = self.pending.clone();
        debug!("Committed pending access");
    }

    /// Promote a set the backend confirmed while further toggles may have
    /// happened. Later edits stay pending on top of it.
    pub fn commit_to(&mut self, committed: &AccessSet) {
        let mut original = committed.clone();
        original.retain_known(&self.known);
        self.original = original;
        debug!(dirty = self.is_dirty(), "Committed access snapshot");
    }

    /// Load a fresh snapshot for the same subject and replay the current diff
    /// on top of it. Returns the edits whose ids left the listing.
    pub fn rebase(&mut self, snapshot: &AccessSet, known: AccessSet) -> Vec<NodeId> {
        let diff = self.diff();
        self.initialize(snapshot, known);

        let edits = diff
            .added_directory_ids
            .iter()
            .map(|&id| (NodeId::Directory(id), true))
            .chain(diff.removed_directory_ids.iter().map(|&id| (NodeId::Directory(id), false)))
            .chain(diff.added_file_ids.iter().map(|&id| (NodeId::File(id), true)))
            .chain(diff.removed_file_ids.iter().map(|&id| (NodeId::File(id), false)));

        let mut lost = Vec::new();
        for (node, granted) in edits {
            if self.toggle(node, granted).is_err() {
                lost.push(node);
            }
        }
        if !lost.is_empty() {
            warn!(?lost, "Pending access edits refer to ids that are no longer listed");
        }
        lost
    }

    /// Throw away edits, `pending := original`
    pub fn discard(&mut self) {
        self.pending = self.original.clone();
    }

    /// Whether `node` differs between `original` and `pending`
    pub fn is_changed(&self, node: NodeId) -> bool {
        self.original.contains(node) != self.pending.contains(node)
    }

    /// Whether `node` is granted in `pending`
    pub fn is_granted(&self, node: NodeId) -> bool {
        self.pending.contains(node)
    }

    pub fn is_known(&self, node: NodeId) -> bool {
        self.known.contains(node)
    }

    /// Full pending set; the backend replaces grants rather than patching them
    pub fn commit_payload(&self) -> AccessCommitPayload {
        AccessCommitPayload::from(&self.pending)
    }

    pub fn original(&self) -> &AccessSet {
        &self.original
    }

    pub fn pending(&self) -> &AccessSet {
        &self.pending
    }

    pub fn known(&self) -> &AccessSet {
        &self.known
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine_with(original: AccessSet, known: AccessSet) -> AccessDiffEngine {
        let mut engine = AccessDiffEngine::new();
        engine.initialize(&original, known);
        engine
    }

    #[test]
    fn test_toggles_touch_pending_only() {
        let mut engine =
            engine_with(AccessSet::from_ids([1], []), AccessSet::from_ids([1, 2], [10]));
        engine.toggle_directory(2, true).unwrap();
        engine.toggle_file(10, true).unwrap();

        assert_eq!(engine.original(), &AccessSet::from_ids([1], []));
        assert_eq!(engine.pending(), &AccessSet::from_ids([1, 2], [10]));
        assert!(engine.is_changed(NodeId::Directory(2)));
        assert!(!engine.is_changed(NodeId::Directory(1)));
        assert!(engine.is_granted(NodeId::File(10)));
    }

    #[test]
    fn test_unknown_id_is_rejected_without_side_effects() {
        let mut engine = engine_with(AccessSet::new(), AccessSet::from_ids([1], [10]));
        let err = engine.toggle_directory(10, true).unwrap_err();
        assert_eq!(err, EngineError::UnknownNode(NodeId::Directory(10)));
        assert!(err.is_stale_target());
        assert!(engine.toggle_file(1, true).is_err());
        assert!(!engine.is_dirty());
    }

    #[test]
    fn test_toggle_back_is_clean() {
        let mut engine = engine_with(AccessSet::from_ids([1], []), AccessSet::from_ids([1], []));
        engine.toggle_directory(1, false).unwrap();
        assert!(engine.is_dirty());
        engine.toggle_directory(1, true).unwrap();
        assert!(!engine.is_dirty());
        assert!(engine.diff().is_empty());
    }

    #[test]
    fn test_initialize_drops_foreign_grants() {
        let engine = engine_with(AccessSet::from_ids([1, 8], [80]), AccessSet::from_ids([1], []));
        assert_eq!(engine.original(), &AccessSet::from_ids([1], []));
        assert!(!engine.is_dirty());
    }

    #[test]
    fn test_discard_restores_original() {
        let mut engine = engine_with(AccessSet::from_ids([1], []), AccessSet::from_ids([1, 2], []));
        engine.toggle_directory(2, true).unwrap();
        engine.discard();
        assert!(!engine.is_dirty());
        assert_eq!(engine.pending(), &AccessSet::from_ids([1], []));
    }

    #[test]
    fn test_commit_payload_is_full_pending_set() {
        let mut engine =
            engine_with(AccessSet::from_ids([1, 2], [10]), AccessSet::from_ids([1, 2, 3], [10]));
        engine.toggle_directory(3, true).unwrap();
        let payload = engine.commit_payload();
        assert_eq!(payload.directory_ids, vec![1, 2, 3]);
        assert_eq!(payload.file_ids, vec![10]);
    }

    #[test]
    fn test_rebase_replays_edits_on_fresh_snapshot() {
        let mut engine =
            engine_with(AccessSet::from_ids([1], [10]), AccessSet::from_ids([1, 2, 3], [10, 11]));
        engine.toggle_directory(2, true).unwrap();
        engine.toggle_file(10, false).unwrap();
        engine.toggle_file(11, true).unwrap();

        // Backend now also grants 3 and no longer lists file 11
        let lost = engine.rebase(
            &AccessSet::from_ids([1, 3], [10]),
            AccessSet::from_ids([1, 2, 3], [10]),
        );

        assert_eq!(lost, vec![NodeId::File(11)]);
        assert_eq!(engine.original(), &AccessSet::from_ids([1, 3], [10]));
        assert_eq!(engine.pending(), &AccessSet::from_ids([1, 2, 3], []));
    }

    #[test]
    fn test_commit_to_keeps_later_edits_pending() {
        let mut engine = engine_with(AccessSet::new(), AccessSet::from_ids([1, 2], []));
        engine.toggle_directory(1, true).unwrap();
        let committed = engine.pending().clone();
        engine.toggle_directory(2, true).unwrap();

        engine.commit_to(&committed);
        assert_eq!(engine.original(), &AccessSet::from_ids([1], []));
        assert_eq!(engine.diff().added_directory_ids, vec![2]);
    }

    #[test]
    fn test_from_records_uses_grant_flags() {
        let dirs = vec![
            DirectoryRecord::new(1, "A", None).with_access(true),
            DirectoryRecord::new(2, "B", Some(1)),
        ];
        let files = vec![FileRecord::new(10, "x", 2).with_access(true)];
        let mut engine = AccessDiffEngine::from_records(&dirs, &files);

        assert_eq!(engine.original(), &AccessSet::from_ids([1], [10]));
        assert!(engine.is_known(NodeId::Directory(2)));
        engine.toggle_directory(2, true).unwrap();
        assert_eq!(engine.diff().change_count(), 1);
    }
}
