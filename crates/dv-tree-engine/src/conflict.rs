// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Upload name-collision decisions
//!
//! The resolver only decides. Creating or replacing files is left to the
//! caller, which submits accepted uploads one at a time.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::config::NameMatchingConfig;
use crate::error::{EngineError, Result};
use crate::naming::NameNormalizer;
use crate::node::TreeNode;

/// Interactive replace prompt
#[cfg_attr(test, mockall::automock)]
pub trait ReplaceConfirmation {
    /// Ask whether `file_name` should replace the existing file it collides with
    fn confirm(&self, file_name: &str) -> bool;
}

impl<F> ReplaceConfirmation for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, file_name: &str) -> bool {
        self(file_name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConflictAction {
    Create,
    ReplaceConfirmed,
    /// The user declined to replace. Not an error.
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictDecision {
    pub file_name: String,
    pub action: ConflictAction,
    /// Id of the colliding file, set for `ReplaceConfirmed` and `Skipped`
    pub existing: Option<u64>,
}

impl ConflictDecision {
    /// Whether the caller should submit this file
    pub fn is_accepted(&self) -> bool {
        !matches!(self.action, ConflictAction::Skipped)
    }
}

#[derive(Debug, Clone, Default)]
pub struct UploadConflictResolver {
    normalizer: NameNormalizer,
}

impl UploadConflictResolver {
    pub fn new(config: &NameMatchingConfig) -> Result<Self> {
        Ok(Self {
            normalizer: NameNormalizer::new(config)?,
        })
    }

    pub fn with_normalizer(normalizer: NameNormalizer) -> Self {
        Self { normalizer }
    }

    pub fn normalizer(&self) -> &NameNormalizer {
        &self.normalizer
    }

    /// Decide what to do with each incoming name, in input order.
    ///
    /// Every name is matched against the directory's file children as they
    /// were before the batch, so two equal names in one batch both resolve to
    /// `Create` when the directory has no such file yet. `confirm` is asked
    /// once per colliding name.
    pub fn resolve<S: AsRef<str>>(
        &self,
        target: &TreeNode,
        incoming: &[S],
        confirm: &dyn ReplaceConfirmation,
    ) -> Result<Vec<ConflictDecision>> {
        if !target.is_directory() {
            return Err(EngineError::NotADirectory(target.id));
        }

        let existing: Vec<(String, u64)> = target
            .files()
            .map(|file| (self.normalizer.normalize(&file.label), file.id.raw()))
            .collect();

        let decisions: Vec<ConflictDecision> = incoming
            .iter()
            .map(|name| {
                let name = name.as_ref();
                let normalized = self.normalizer.normalize(name);
                let collision = existing
                    .iter()
                    .find(|(existing_name, _)| *existing_name == normalized)
                    .map(|(_, id)| *id);

                let action = match collision {
                    None => ConflictAction::Create,
                    Some(_) if confirm.confirm(name) => ConflictAction::ReplaceConfirmed,
                    Some(_) => ConflictAction::Skipped,
                };
                trace!(file_name = name, ?action, existing = ?collision, "Resolved upload");
                ConflictDecision {
                    file_name: name.to_string(),
                    action,
                    existing: collision,
                }
            })
            .collect();

        debug!(
            directory = %target.id,
            incoming = decisions.len(),
            skipped = decisions.iter().filter(|d| !d.is_accepted()).count(),
            "Resolved upload batch"
        );
        Ok(decisions)
    }
}
