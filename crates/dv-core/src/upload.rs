// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Sequential upload of a resolved batch

use dv_domain_types::UploadRequest;
use dv_tree_engine::{ConflictAction, ConflictDecision};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::client::StorageClientApi;
use crate::error::FailureKind;

/// One dropped file with its resolved decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedUpload {
    pub decision: ConflictDecision,
    pub content: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum UploadOutcome {
    Uploaded {
        file_name: String,
        replaced: Option<u64>,
    },
    Skipped { file_name: String },
    Failed {
        file_name: String,
        kind: FailureKind,
        detail: String,
    },
    /// Not submitted because an earlier file in the batch failed
    NotAttempted { file_name: String },
}

impl UploadOutcome {
    pub fn file_name(&self) -> &str {
        match self {
            UploadOutcome::Uploaded { file_name, .. }
            | UploadOutcome::Skipped { file_name }
            | UploadOutcome::Failed { file_name, .. }
            | UploadOutcome::NotAttempted { file_name } => file_name,
        }
    }
}

/// Per-file outcomes, in batch order
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UploadReport {
    pub outcomes: Vec<UploadOutcome>,
    /// Set when the listing could not be reloaded after files landed; the
    /// pane still shows the snapshot from before the batch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_failure: Option<FailureKind>,
}

impl UploadReport {
    pub fn uploaded_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, UploadOutcome::Uploaded { .. }))
            .count()
    }

    pub fn failure(&self) -> Option<&UploadOutcome> {
        self.outcomes.iter().find(|o| matches!(o, UploadOutcome::Failed { .. }))
    }

    /// Every accepted file was uploaded
    pub fn is_complete(&self) -> bool {
        self.outcomes
            .iter()
            .all(|o| matches!(o, UploadOutcome::Uploaded { .. } | UploadOutcome::Skipped { .. }))
    }
}

/// Submit accepted files into `directory_id` one at a time, each awaited
/// before the next starts.
///
/// The first transport failure stops the batch; later files are reported as
/// not attempted so the listing never disagrees with what the user was told.
pub async fn upload_batch(
    client: &dyn StorageClientApi,
    directory_id: u64,
    batch: Vec<PlannedUpload>,
) -> UploadReport {
    let mut report = UploadReport::default();
    let mut stopped = false;

    for PlannedUpload { decision, content } in batch {
        let file_name = decision.file_name;
        if decision.action == ConflictAction::Skipped {
            report.outcomes.push(UploadOutcome::Skipped { file_name });
            continue;
        }
        if stopped {
            report.outcomes.push(UploadOutcome::NotAttempted { file_name });
            continue;
        }

        let replaces = match decision.action {
            ConflictAction::ReplaceConfirmed => decision.existing,
            _ => None,
        };
        let request = UploadRequest {
            directory_id,
            name: file_name,
            content,
            replaces,
        };
        match client.upload_file(&request).await {
            Ok(()) => {
                debug!(directory_id, file_name = %request.name, ?replaces, "Uploaded file");
                report.outcomes.push(UploadOutcome::Uploaded {
                    file_name: request.name,
                    replaced: replaces,
                });
            }
            Err(e) => {
                warn!(
                    directory_id,
                    file_name = %request.name,
                    error = %e,
                    "Upload failed, stopping batch"
                );
                stopped = true;
                report.outcomes.push(UploadOutcome::Failed {
                    file_name: request.name,
                    kind: e.kind(),
                    detail: e.to_string(),
                });
            }
        }
    }

    info!(
        directory_id,
        uploaded = report.uploaded_count(),
        total = report.outcomes.len(),
        "Upload batch finished"
    );
    report
}
