// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Context menu and preview selection state
//!
//! ```text
//! Closed --open_at--> Open
//! Open   --close----> Closed   (action chosen, outside click, escape, scope switch)
//! Open   --open_at--> Open     (reanchored in one step)
//! ```
//!
//! The preview selection is tracked alongside the menu but neither gates the
//! other.

use dv_domain_types::{NodeId, NodeKind, TreeScope};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, trace, warn};

use crate::builder::Forest;
use crate::error::{EngineError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuAnchor {
    pub x: i32,
    pub y: i32,
    pub target: NodeId,
    pub scope: TreeScope,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MenuState {
    #[default]
    Closed,
    Open(MenuAnchor),
}

/// Presentation form of the menu state; every field is `None` while closed
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuAnchorView {
    pub x: Option<i32>,
    pub y: Option<i32>,
    pub target_key: Option<String>,
    pub target_kind: Option<NodeKind>,
    pub tree_scope: Option<TreeScope>,
}

impl From<&MenuState> for MenuAnchorView {
    fn from(state: &MenuState) -> Self {
        match state {
            MenuState::Closed => Self::default(),
            MenuState::Open(anchor) => Self {
                x: Some(anchor.x),
                y: Some(anchor.y),
                target_key: Some(anchor.target.to_string()),
                target_kind: Some(anchor.target.kind()),
                tree_scope: Some(anchor.scope),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MenuAction {
    CreateFolder,
    CreateFile,
    DeleteFolder,
    DeleteFile,
}

impl MenuAction {
    /// Actions offered for `target` in `scope`. Archived folders can only be
    /// deleted.
    pub fn available_for(target: NodeId, scope: TreeScope) -> &'static [MenuAction] {
        match (target.kind(), scope) {
            (NodeKind::Directory, TreeScope::Active) => {
                &[MenuAction::CreateFolder, MenuAction::CreateFile, MenuAction::DeleteFolder]
            }
            (NodeKind::Directory, TreeScope::Archived) => &[MenuAction::DeleteFolder],
            (NodeKind::File, _) => &[MenuAction::DeleteFile],
        }
    }
}

impl fmt::Display for MenuAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MenuAction::CreateFolder => write!(f, "create-folder"),
            MenuAction::CreateFile => write!(f, "create-file"),
            MenuAction::DeleteFolder => write!(f, "delete-folder"),
            MenuAction::DeleteFile => write!(f, "delete-file"),
        }
    }
}

/// A validated menu action, handed to the caller to carry out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuCommand {
    pub action: MenuAction,
    pub target: NodeId,
    pub scope: TreeScope,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub node: NodeId,
    pub scope: TreeScope,
}

/// Owned per browser view. Holds at most one live menu anchor.
#[derive(Debug, Clone, Default)]
pub struct SelectionController {
    menu: MenuState,
    selection: Option<Selection>,
}

impl SelectionController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the menu on `target`, replacing any anchor already open
    pub fn open_at(&mut self, x: i32, y: i32, target: NodeId, scope: TreeScope) {
        if let MenuState::Open(previous) = &self.menu {
            trace!(previous = %previous.target, "Reanchoring open context menu");
        }
        self.menu = MenuState::Open(MenuAnchor {
            x,
            y,
            target,
            scope,
        });
        debug!(node = %target, %scope, x, y, "Opened context menu");
    }

    pub fn close(&mut self) {
        if self.is_open() {
            debug!("Closed context menu");
        }
        self.menu = MenuState::Closed;
    }

    /// Move an open menu without changing its target. No-op while closed.
    pub fn move_to(&mut self, x: i32, y: i32) {
        if let MenuState::Open(anchor) = &mut self.menu {
            anchor.x = x;
            anchor.y = y;
        }
    }

    /// Switching between the active and archived trees always closes the menu
    pub fn switch_scope(&mut self) {
        self.close();
    }

    pub fn is_open(&self) -> bool {
        matches!(self.menu, MenuState::Open(_))
    }

    pub fn state(&self) -> &MenuState {
        &self.menu
    }

    pub fn anchor(&self) -> Option<&MenuAnchor> {
        match &self.menu {
            MenuState::Open(anchor) => Some(anchor),
            MenuState::Closed => None,
        }
    }

    pub fn view(&self) -> MenuAnchorView {
        MenuAnchorView::from(&self.menu)
    }

    /// Actions for the open menu, empty while closed
    pub fn available_actions(&self) -> &'static [MenuAction] {
        match &self.menu {
            MenuState::Open(anchor) => MenuAction::available_for(anchor.target, anchor.scope),
            MenuState::Closed => &[],
        }
    }

    /// Validate `action` against the open menu and the current forest of the
    /// menu's scope, then close the menu.
    ///
    /// A target that vanished from `forest` closes the menu and reports a
    /// stale-target error. An unavailable action leaves the menu open.
    pub fn dispatch(&mut self, action: MenuAction, forest: &Forest) -> Result<MenuCommand> {
        let anchor = *self.anchor().ok_or(EngineError::MenuClosed)?;

        if !forest.contains(anchor.target) {
            warn!(node = %anchor.target, %action, "Menu target is no longer in the tree");
            self.close();
            return Err(EngineError::UnknownNode(anchor.target));
        }
        if !MenuAction::available_for(anchor.target, anchor.scope).contains(&action) {
            return Err(EngineError::ActionUnavailable {
                action,
                target: anchor.target,
            });
        }

        self.close();
        debug!(%action, node = %anchor.target, "Dispatched menu action");
        Ok(MenuCommand {
            action,
            target: anchor.target,
            scope: anchor.scope,
        })
    }

    pub fn select(&mut self, node: NodeId, scope: TreeScope) {
        self.selection = Some(Selection { node, scope });
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    pub fn selected(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    /// Drop the selection and close the menu when they point at nodes that a
    /// fresh `forest` for `scope` no longer contains
    pub fn retain_valid(&mut self, scope: TreeScope, forest: &Forest) {
        if let Some(selection) = self.selection {
            if selection.scope == scope && !forest.contains(selection.node) {
                debug!(node = %selection.node, "Clearing selection of a removed node");
                self.selection = None;
            }
        }
        if let Some(anchor) = self.anchor().copied() {
            if anchor.scope == scope && !forest.contains(anchor.target) {
                self.close();
            }
        }
    }
}
