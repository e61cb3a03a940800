// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! File browser session: both storage panes, the context menu and uploads

use dv_domain_types::{DirectoryListing, NodeId, TreeScope};
use dv_tree_engine::{
    ConflictDecision, EngineConfig, EngineError, Forest, MenuAction, MenuCommand,
    ReplaceConfirmation, SelectionController, UploadConflictResolver,
};
use tracing::{debug, info, warn};

use crate::access_editor::LoadOutcome;
use crate::client::StorageClientApi;
use crate::error::Result;
use crate::upload::{PlannedUpload, UploadReport, upload_batch};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrowseTicket {
    pub scope: TreeScope,
    sequence: u64,
}

/// A dropped file before conflict resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedFile {
    pub name: String,
    pub content: Vec<u8>,
}

impl DroppedFile {
    pub fn new(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Default)]
struct Pane {
    forest: Forest,
    sequence: u64,
}

/// Owned by one browser view and passed to its handlers
#[derive(Debug, Default)]
pub struct BrowserSession {
    active: Pane,
    archived: Pane,
    scope: TreeScope,
    selection: SelectionController,
    resolver: UploadConflictResolver,
}

impl BrowserSession {
    pub fn new(config: &EngineConfig) -> Result<Self> {
        Ok(Self {
            resolver: UploadConflictResolver::new(&config.name_matching)?,
            ..Self::default()
        })
    }

    fn pane(&self, scope: TreeScope) -> &Pane {
        match scope {
            TreeScope::Active => &self.active,
            TreeScope::Archived => &self.archived,
        }
    }

    fn pane_mut(&mut self, scope: TreeScope) -> &mut Pane {
        match scope {
            TreeScope::Active => &mut self.active,
            TreeScope::Archived => &mut self.archived,
        }
    }

    pub fn scope(&self) -> TreeScope {
        self.scope
    }

    /// Show the other pane. Any open menu is closed.
    pub fn switch_scope(&mut self, scope: TreeScope) {
        if self.scope != scope {
            debug!(from = %self.scope, to = %scope, "Switching tree scope");
            self.scope = scope;
            self.selection.switch_scope();
        }
    }

    pub fn forest(&self, scope: TreeScope) -> &Forest {
        &self.pane(scope).forest
    }

    pub fn current_forest(&self) -> &Forest {
        self.forest(self.scope)
    }

    pub fn begin_load(&mut self, scope: TreeScope) -> BrowseTicket {
        let pane = self.pane_mut(scope);
        pane.sequence += 1;
        BrowseTicket {
            scope,
            sequence: pane.sequence,
        }
    }

    /// Replace the pane's forest with a fresh snapshot. Only the most recent
    /// ticket of each pane is applied.
    pub fn apply_load(&mut self, ticket: BrowseTicket, listing: &DirectoryListing) -> LoadOutcome {
        if ticket.sequence != self.pane(ticket.scope).sequence {
            warn!(scope = %ticket.scope, "Ignoring stale directory listing");
            return LoadOutcome::Stale;
        }

        let forest = Forest::materialize(&listing.directories, &listing.files);
        if forest.report.is_partial() {
            info!(
                scope = %ticket.scope,
                virtual_roots = forest.report.virtual_roots.len(),
                orphaned_files = forest.report.orphaned_files.len(),
                unreachable_directories = forest.report.unreachable_directories.len(),
                "Directory tree is partially visible"
            );
        }
        self.selection.retain_valid(ticket.scope, &forest);
        self.pane_mut(ticket.scope).forest = forest;
        LoadOutcome::Applied
    }

    pub async fn refresh(
        &mut self,
        client: &dyn StorageClientApi,
        scope: TreeScope,
    ) -> Result<LoadOutcome> {
        let ticket = self.begin_load(scope);
        let listing = client.list_directories(scope).await?;
        Ok(self.apply_load(ticket, &listing))
    }

    fn ensure_visible(&self, node: NodeId) -> Result<()> {
        if self.current_forest().contains(node) {
            Ok(())
        } else {
            Err(EngineError::UnknownNode(node).into())
        }
    }

    /// Right-click on a node of the current pane
    pub fn open_menu(&mut self, x: i32, y: i32, target: NodeId) -> Result<()> {
        self.ensure_visible(target)?;
        self.selection.open_at(x, y, target, self.scope);
        Ok(())
    }

    pub fn move_menu(&mut self, x: i32, y: i32) {
        self.selection.move_to(x, y);
    }

    pub fn close_menu(&mut self) {
        self.selection.close();
    }

    /// Validate a menu choice. Carrying it out is up to the caller.
    pub fn dispatch(&mut self, action: MenuAction) -> Result<MenuCommand> {
        let scope = self.selection.anchor().map(|anchor| anchor.scope).unwrap_or(self.scope);
        let forest = match scope {
            TreeScope::Active => &self.active.forest,
            TreeScope::Archived => &self.archived.forest,
        };
        Ok(self.selection.dispatch(action, forest)?)
    }

    /// Select a node of the current pane for preview
    pub fn select(&mut self, node: NodeId) -> Result<()> {
        self.ensure_visible(node)?;
        self.selection.select(node, self.scope);
        Ok(())
    }

    pub fn selection(&self) -> &SelectionController {
        &self.selection
    }

    /// Resolve dropped names against the directory's current files
    pub fn plan_upload(
        &self,
        directory_id: u64,
        names: &[String],
        confirm: &dyn ReplaceConfirmation,
    ) -> Result<Vec<ConflictDecision>> {
        let target = NodeId::Directory(directory_id);
        let node = self.current_forest().find(target).ok_or(EngineError::UnknownNode(target))?;
        Ok(self.resolver.resolve(node, names, confirm)?)
    }

    /// Resolve, upload sequentially and refresh the pane when anything landed.
    ///
    /// Once files have been sent the report is always returned. A failed
    /// refresh is recorded in `UploadReport::refresh_failure` instead.
    pub async fn upload(
        &mut self,
        client: &dyn StorageClientApi,
        directory_id: u64,
        files: Vec<DroppedFile>,
        confirm: &dyn ReplaceConfirmation,
    ) -> Result<UploadReport> {
        let names: Vec<String> = files.iter().map(|file| file.name.clone()).collect();
        let decisions = self.plan_upload(directory_id, &names, confirm)?;

        let batch = decisions
            .into_iter()
            .zip(files)
            .map(|(decision, file)| PlannedUpload {
                decision,
                content: file.content,
            })
            .collect();
        let mut report = upload_batch(client, directory_id, batch).await;

        if report.uploaded_count() > 0 {
            if let Err(e) = self.refresh(client, self.scope).await {
                warn!(
                    directory_id,
                    uploaded = report.uploaded_count(),
                    error = %e,
                    "Listing refresh after upload failed"
                );
                report.refresh_failure = e.failure_kind();
            }
        }
        Ok(report)
    }
}
