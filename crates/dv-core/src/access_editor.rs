// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Access editing session for one subject at a time
//!
//! Requests are split into a `begin_*` call that issues a ticket and an
//! `apply_*`/`finish_*` call that consumes the response. Tickets carry the
//! subject generation, so a response that arrives after the user moved to
//! another subject is dropped instead of merged.

use dv_domain_types::{AccessCommitPayload, AccessSet, DirectoryListing, NodeId};
use dv_tree_engine::{AccessDiff, AccessDiffEngine, Forest};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::client::StorageClientApi;
use crate::error::{CoreError, Result};

/// Whether a response was applied or ignored as stale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LoadOutcome {
    Applied,
    Stale,
}

impl LoadOutcome {
    pub fn is_applied(self) -> bool {
        matches!(self, LoadOutcome::Applied)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    pub subject_id: u64,
    generation: u64,
    sequence: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitTicket {
    pub subject_id: u64,
    pub payload: AccessCommitPayload,
    generation: u64,
    committed: AccessSet,
}

#[derive(Debug, Default)]
pub struct AccessEditor {
    subject: Option<u64>,
    /// Bumped whenever the edited subject changes
    generation: u64,
    /// Latest load issued for the current generation
    load_sequence: u64,
    loaded: bool,
    engine: AccessDiffEngine,
    forest: Forest,
}

impl AccessEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch to another subject. Pending edits are discarded without being
    /// committed and every outstanding ticket becomes stale.
    pub fn select_subject(&mut self, subject_id: u64) -> LoadTicket {
        if self.engine.is_dirty() {
            info!(
                previous = ?self.subject,
                discarded = self.engine.diff().change_count(),
                "Discarding uncommitted access edits"
            );
        }
        self.generation += 1;
        self.load_sequence = 0;
        self.subject = Some(subject_id);
        self.loaded = false;
        self.engine = AccessDiffEngine::new();
        self.forest = Forest::default();
        debug!(subject_id, generation = self.generation, "Selected access subject");
        self.next_ticket(subject_id)
    }

    /// Ticket for refreshing the current subject
    pub fn begin_load(&mut self) -> Result<LoadTicket> {
        let subject_id = self.subject.ok_or(CoreError::NoSubject)?;
        Ok(self.next_ticket(subject_id))
    }

    fn next_ticket(&mut self, subject_id: u64) -> LoadTicket {
        self.load_sequence += 1;
        LoadTicket {
            subject_id,
            generation: self.generation,
            sequence: self.load_sequence,
        }
    }

    /// Apply a fetched listing. The first load initializes the engine from
    /// the listing's grant flags; later loads for the same subject rebase
    /// pending edits onto the new snapshot.
    pub fn apply_load(&mut self, ticket: LoadTicket, listing: &DirectoryListing) -> LoadOutcome {
        if ticket.generation != self.generation || ticket.sequence != self.load_sequence {
            warn!(
                subject_id = ticket.subject_id,
                current = ?self.subject,
                "Ignoring stale access listing"
            );
            return LoadOutcome::Stale;
        }

        let snapshot = listing.access_snapshot();
        let known = AccessSet::universe(&listing.directories, &listing.files);
        if self.loaded {
            self.engine.rebase(&snapshot, known);
        } else {
            self.engine.initialize(&snapshot, known);
            self.loaded = true;
        }
        self.forest = Forest::materialize(&listing.directories, &listing.files);
        debug!(
            subject_id = ticket.subject_id,
            granted = self.engine.original().len(),
            "Applied access listing"
        );
        LoadOutcome::Applied
    }

    pub fn toggle(&mut self, node: NodeId, granted: bool) -> Result<()> {
        self.subject.ok_or(CoreError::NoSubject)?;
        Ok(self.engine.toggle(node, granted)?)
    }

    pub fn discard(&mut self) {
        self.engine.discard();
    }

    /// Snapshot the pending set for a save request
    pub fn begin_commit(&self) -> Result<CommitTicket> {
        let subject_id = self.subject.ok_or(CoreError::NoSubject)?;
        Ok(CommitTicket {
            subject_id,
            payload: self.engine.commit_payload(),
            generation: self.generation,
            committed: self.engine.pending().clone(),
        })
    }

    /// Record a save the backend confirmed. Toggles made while the request
    /// was in flight stay pending.
    pub fn finish_commit(&mut self, ticket: CommitTicket) -> LoadOutcome {
        if ticket.generation != self.generation {
            warn!(
                subject_id = ticket.subject_id,
                "Ignoring commit for a subject no longer edited"
            );
            return LoadOutcome::Stale;
        }
        if &ticket.committed == self.engine.pending() {
            self.engine.commit();
        } else {
            self.engine.commit_to(&ticket.committed);
        }
        info!(subject_id = ticket.subject_id, "Access grants saved");
        LoadOutcome::Applied
    }

    /// Fetch and apply the current subject's listing
    pub async fn load(&mut self, client: &dyn StorageClientApi) -> Result<LoadOutcome> {
        let ticket = self.begin_load()?;
        let listing = client.list_subject_tree(ticket.subject_id).await?;
        Ok(self.apply_load(ticket, &listing))
    }

    /// Persist the pending set, then reload the subject so the editor shows
    /// the grants the backend actually holds. Nothing is sent when there are
    /// no edits. A failed reload after an accepted save is logged and the
    /// committed set stays in place.
    pub async fn save(&mut self, client: &dyn StorageClientApi) -> Result<LoadOutcome> {
        let ticket = self.begin_commit()?;
        let subject_id = ticket.subject_id;
        if !self.engine.is_dirty() {
            debug!(subject_id, "No access changes to save");
            return Ok(LoadOutcome::Applied);
        }
        client.replace_access(subject_id, &ticket.payload).await?;
        let outcome = self.finish_commit(ticket);
        if outcome.is_applied() {
            if let Err(e) = self.load(client).await {
                warn!(subject_id, error = %e, "Reloading grants after save failed");
            }
        }
        Ok(outcome)
    }

    pub fn subject(&self) -> Option<u64> {
        self.subject
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn is_dirty(&self) -> bool {
        self.engine.is_dirty()
    }

    pub fn diff(&self) -> AccessDiff {
        self.engine.diff()
    }

    pub fn is_changed(&self, node: NodeId) -> bool {
        self.engine.is_changed(node)
    }

    pub fn is_granted(&self, node: NodeId) -> bool {
        self.engine.is_granted(node)
    }

    pub fn engine(&self) -> &AccessDiffEngine {
        &self.engine
    }

    pub fn forest(&self) -> &Forest {
        &self.forest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dv_domain_types::{DirectoryRecord, FileRecord};

    fn listing(granted_dirs: &[u64]) -> DirectoryListing {
        let directories = (1..=3)
            .map(|id| {
                DirectoryRecord::new(id, format!("d{id}"), (id > 1).then_some(1))
                    .with_access(granted_dirs.contains(&id))
            })
            .collect();
        DirectoryListing::new(directories, vec![FileRecord::new(10, "a.txt", 2)])
    }

    #[test]
    fn test_late_response_for_previous_subject_is_ignored() {
        let mut editor = AccessEditor::new();
        let first = editor.select_subject(7);
        let second = editor.select_subject(8);

        assert_eq!(editor.apply_load(first, &listing(&[1])), LoadOutcome::Stale);
        assert!(!editor.is_loaded());
        assert_eq!(editor.apply_load(second, &listing(&[2])), LoadOutcome::Applied);
        assert!(editor.is_granted(NodeId::Directory(2)));
    }

    #[test]
    fn test_older_refresh_loses_to_newer() {
        let mut editor = AccessEditor::new();
        let initial = editor.select_subject(7);
        editor.apply_load(initial, &listing(&[1]));

        let older = editor.begin_load().unwrap();
        let newer = editor.begin_load().unwrap();
        assert_eq!(editor.apply_load(older, &listing(&[])), LoadOutcome::Stale);
        assert_eq!(editor.apply_load(newer, &listing(&[1, 3])), LoadOutcome::Applied);
        assert!(editor.is_granted(NodeId::Directory(3)));
    }

    #[test]
    fn test_switching_subject_discards_pending() {
        let mut editor = AccessEditor::new();
        let ticket = editor.select_subject(7);
        editor.apply_load(ticket, &listing(&[]));
        editor.toggle(NodeId::Directory(1), true).unwrap();
        assert!(editor.is_dirty());

        editor.select_subject(8);
        assert!(!editor.is_dirty());
        // Nothing is loaded for the new subject yet
        assert!(editor.toggle(NodeId::Directory(1), true).unwrap_err().is_stale_target());
    }

    #[test]
    fn test_refresh_keeps_edits() {
        let mut editor = AccessEditor::new();
        let ticket = editor.select_subject(7);
        editor.apply_load(ticket, &listing(&[1]));
        editor.toggle(NodeId::File(10), true).unwrap();

        let refresh = editor.begin_load().unwrap();
        editor.apply_load(refresh, &listing(&[1, 2]));
        assert_eq!(editor.engine().original(), &AccessSet::from_ids([1, 2], []));
        assert_eq!(editor.diff().added_file_ids, vec![10]);
    }

    #[test]
    fn test_commit_after_subject_change_is_stale() {
        let mut editor = AccessEditor::new();
        let ticket = editor.select_subject(7);
        editor.apply_load(ticket, &listing(&[]));
        editor.toggle(NodeId::Directory(2), true).unwrap();

        let commit = editor.begin_commit().unwrap();
        assert_eq!(commit.payload.directory_ids, vec![2]);
        editor.select_subject(8);
        assert_eq!(editor.finish_commit(commit), LoadOutcome::Stale);
    }

    #[test]
    fn test_no_subject() {
        let mut editor = AccessEditor::new();
        assert!(matches!(editor.begin_load(), Err(CoreError::NoSubject)));
        assert!(matches!(editor.toggle(NodeId::Directory(1), true), Err(CoreError::NoSubject)));
    }
}
