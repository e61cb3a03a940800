// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Pure tree engine for the doc-vault file browser
//!
//! Everything here is synchronous and performs no I/O. Network calls, retries
//! and ownership of the per-session state live in `dv-core`.

pub mod access;
pub mod builder;
pub mod config;
pub mod conflict;
pub mod error;
pub mod naming;
pub mod node;
pub mod selection;
pub mod virtual_root;

pub use access::{AccessDiff, AccessDiffEngine};
pub use builder::{Forest, VisibilityReport, build};
pub use config::{EngineConfig, NameMatchingConfig};
pub use conflict::{ConflictAction, ConflictDecision, ReplaceConfirmation, UploadConflictResolver};
pub use error::{EngineError, Result};
pub use naming::NameNormalizer;
pub use node::TreeNode;
pub use selection::{
    MenuAction, MenuAnchor, MenuAnchorView, MenuCommand, MenuState, Selection, SelectionController,
};
pub use virtual_root::mark_virtual_roots;
