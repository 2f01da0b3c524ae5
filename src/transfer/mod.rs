//! Streaming shader cache transfers
//!
//! Downloads and uploads share the same contract: bytes are counted by the
//! transfer itself, progress is throttled per transfer, and expected
//! failures resolve to an outcome instead of an error.

mod cancel;
mod download;
mod progress;
mod upload;

pub use cancel::{CancelGuard, CancelRegistry};
pub use download::Downloader;
pub use progress::{NoProgress, ProgressEvent, ProgressSink, ProgressTracker, PROGRESS_INTERVAL};
pub use upload::{ArchiveUploader, HttpUploader, UploadResponse};

use std::fmt;

/// How a transfer ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferOutcome {
    Success,
    Cancelled,
    Failed(String),
}

impl TransferOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl fmt::Display for TransferOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "completed"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}
