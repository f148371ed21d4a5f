/// Upload panel state machine
///
/// `Idle -> Selected -> Uploading -> (Idle | Failed)`. `Failed` still holds
/// the selection so the user can retry. Validation (size cap, missing
/// selection) happens here, before anything touches the network.

use std::path::PathBuf;

use super::notify::Notification;
use crate::api::{ApiError, UploadOutcome, UploadStatus};

/// Largest file accepted for upload (10 MiB)
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

const UPLOAD_FAILED: &str = "Upload failed";

/// A file picked from disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub path: PathBuf,
    pub name: String,
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum UploadPhase {
    #[default]
    Idle,
    Selected(SelectedFile),
    Uploading(SelectedFile),
    /// Last attempt failed; the selection is kept
    Failed { file: SelectedFile, error: String },
}

/// Result of pressing the upload button
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitAction {
    /// Send this file
    Start(SelectedFile),
    /// Rejected without a network call
    Rejected(Notification),
    /// An upload is already running
    Busy,
}

/// What the rest of the UI should do after an upload settles
#[derive(Debug, Clone, PartialEq)]
pub struct UploadResolution {
    pub notification: Notification,
    /// Whether the cached file list must be invalidated
    pub invalidate: bool,
    /// Whether the caller's success callback runs
    pub notify_success: bool,
}

#[derive(Debug, Default)]
pub struct UploadPanel {
    phase: UploadPhase,
}

impl UploadPanel {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn phase(&self) -> &UploadPhase {
        &self.phase
    }

    pub fn selected(&self) -> Option<&SelectedFile> {
        match &self.phase {
            UploadPhase::Idle => None,
            UploadPhase::Selected(file) | UploadPhase::Uploading(file) => Some(file),
            UploadPhase::Failed { file, .. } => Some(file),
        }
    }

    pub fn is_uploading(&self) -> bool {
        matches!(self.phase, UploadPhase::Uploading(_))
    }

    pub fn last_error(&self) -> Option<&str> {
        match &self.phase {
            UploadPhase::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    /// Pick a file. Oversized files are rejected and the current selection
    /// stays as it was.
    pub fn select(&mut self, file: SelectedFile) -> Result<(), Notification> {
        if self.is_uploading() {
            tracing::debug!(file = %file.name, "selection ignored while uploading");
            return Ok(());
        }
        if file.size > MAX_UPLOAD_BYTES {
            tracing::info!(file = %file.name, size = file.size, "rejected oversized file");
            return Err(Notification::error("File size exceeds 10MB limit").with_key("file-too-large"));
        }
        self.phase = UploadPhase::Selected(file);
        Ok(())
    }

    pub fn submit(&mut self) -> SubmitAction {
        match std::mem::take(&mut self.phase) {
            UploadPhase::Idle => {
                SubmitAction::Rejected(Notification::error("Please select a file first").with_key("no-file"))
            }
            UploadPhase::Uploading(file) => {
                self.phase = UploadPhase::Uploading(file);
                SubmitAction::Busy
            }
            UploadPhase::Selected(file) | UploadPhase::Failed { file, .. } => {
                self.phase = UploadPhase::Uploading(file.clone());
                SubmitAction::Start(file)
            }
        }
    }

    /// Settle the running upload
    pub fn finish(&mut self, result: Result<UploadOutcome, ApiError>) -> UploadResolution {
        let file = match std::mem::take(&mut self.phase) {
            UploadPhase::Uploading(file) | UploadPhase::Selected(file) => Some(file),
            UploadPhase::Failed { file, .. } => Some(file),
            UploadPhase::Idle => None,
        };

        match result {
            Ok(outcome) if outcome.status == UploadStatus::Duplicate => {
                // Nothing new was stored, but the server bumped the existing
                // file's reference count, so the listing is refreshed anyway.
                UploadResolution {
                    notification: Notification::warning(duplicate_message(&outcome)),
                    invalidate: true,
                    notify_success: false,
                }
            }
            Ok(outcome) if outcome.status == UploadStatus::Success => UploadResolution {
                notification: Notification::success(outcome.message),
                invalidate: true,
                notify_success: true,
            },
            Ok(outcome) => self.fail(file, outcome.message),
            Err(err) => self.fail(file, err.message().to_string()),
        }
    }

    fn fail(&mut self, file: Option<SelectedFile>, message: String) -> UploadResolution {
        let message = if message.trim().is_empty() {
            UPLOAD_FAILED.to_string()
        } else {
            message
        };
        if let Some(file) = file {
            self.phase = UploadPhase::Failed {
                file,
                error: message.clone(),
            };
        }
        UploadResolution {
            notification: Notification::error(message),
            invalidate: false,
            notify_success: false,
        }
    }
}

/// Warning text for a duplicate upload
pub fn duplicate_message(outcome: &UploadOutcome) -> String {
    format!(
        "File({}) already exists. Saved {:.2} MB of storage.",
        outcome.existing_name().unwrap_or("unknown"),
        outcome.saved_megabytes()
    )
}
