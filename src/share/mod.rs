//! Sharing a locally built shader cache
//!
//! The share flow proves the cache is usable before publishing it: the
//! emulator is launched with logging forced on, its output must show the
//! expected title loading exactly as many shaders as the local archive
//! holds, and only then is the cache packed, uploaded and announced.

mod announce;
pub mod emulator_config;
mod packager;

pub use announce::{decode_link, encode_link, Announcement};
pub use packager::pack_shaders;

use crate::error::ShaderkitError;
use crate::remote::{MetadataResolver, ShaderRemote, TitleMetadata};
use crate::supervisor::{ProcessSupervisor, RunReport, SupervisionOutcome};
use crate::title::TitleId;
use crate::transfer::{ArchiveUploader, ProgressSink};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Asks the user which emulator binary to run
#[async_trait]
pub trait BinaryPicker: Send + Sync {
    /// `None` when the user backs out
    async fn pick_binary(&self) -> Option<PathBuf>;
}

/// A share that did not go through, with a stable machine-readable code
#[derive(Debug, Error)]
pub enum ShareFailure {
    #[error("Operation cancelled")]
    OperationCanceled,

    #[error("{path} does not look like a {expected} binary")]
    InvalidEmulatorBinary { path: PathBuf, expected: String },

    #[error("The emulator exited before reporting which title it ran and how many shaders it loaded")]
    NoObservation,

    #[error("{0}")]
    Mismatch(#[from] ValidationMismatch),

    #[error("Upload failed")]
    UploadFailed,

    #[error(transparent)]
    Failed(#[from] ShaderkitError),
}

impl ShareFailure {
    pub fn code(&self) -> &'static str {
        match self {
            Self::OperationCanceled => "OPERATION_CANCELED",
            Self::InvalidEmulatorBinary { .. } => "INVALID_RYUJINX_BINARY",
            Self::NoObservation => "EMULATOR_NO_OBSERVATION",
            Self::Mismatch(ValidationMismatch::WrongTitle { .. }) => "SHARE_WRONG_TITLE",
            Self::Mismatch(ValidationMismatch::ShaderCountMismatch { .. }) => {
                "SHARE_SHADER_COUNT_MISMATCH"
            }
            Self::UploadFailed => "SHARE_UPLOAD_FAIL",
            Self::Failed(_) => "SHARE_FAILED",
        }
    }
}

/// Observed run facts that contradict the share request
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationMismatch {
    #[error("You shared the wrong title id, you had to run {expected} in the emulator")]
    WrongTitle { expected: String },

    #[error(
        "You have {local} shaders in your cache but the emulator compiled {compiled}. \
         Some shaders were corrupted or rejected, most likely because they were built by an \
         older emulator release that has since changed its shader format. The game probably \
         runs fine, but a shared cache must be fully valid for everyone, so this submission \
         was rejected."
    )]
    ShaderCountMismatch { local: u64, compiled: u64 },
}

/// Proof that a run matched the request; required to continue sharing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRun {
    report: RunReport,
}

impl ValidatedRun {
    pub fn report(&self) -> &RunReport {
        &self.report
    }
}

/// Check a run report against what is about to be shared
pub fn validate_run(
    report: RunReport,
    title: &TitleId,
    local_count: u64,
    metadata: &TitleMetadata,
) -> Result<ValidatedRun, ValidationMismatch> {
    if !title.matches(&report.ran_title_id) {
        return Err(ValidationMismatch::WrongTitle {
            expected: metadata.display_name().to_string(),
        });
    }
    if report.compiled_shaders != local_count {
        return Err(ValidationMismatch::ShaderCountMismatch {
            local: local_count,
            compiled: report.compiled_shaders,
        });
    }
    Ok(ValidatedRun { report })
}

/// Whether `binary`'s file name contains `expected`, ignoring case
pub fn is_emulator_binary(binary: &Path, expected: &str) -> bool {
    binary
        .file_name()
        .map(|name| {
            name.to_string_lossy()
                .to_lowercase()
                .contains(&expected.to_lowercase())
        })
        .unwrap_or(false)
}

/// Inputs of one share
#[derive(Debug, Clone)]
pub struct ShareRequest {
    pub title: TitleId,
    pub data_root: PathBuf,
    /// Entries in the local `cache.zip`
    pub local_count: u64,
    /// Entries the shared cache currently holds
    pub remote_count: u64,
}

/// Result of a completed share
#[derive(Debug, Clone)]
pub struct ShareReceipt {
    pub report: RunReport,
    pub archive: PathBuf,
    pub short_link: String,
    pub announcement: String,
}

/// Runs the validate, pack, upload and announce sequence
pub struct ShareOrchestrator {
    picker: Arc<dyn BinaryPicker>,
    metadata: Arc<dyn MetadataResolver>,
    remote: Arc<dyn ShaderRemote>,
    uploader: Arc<dyn ArchiveUploader>,
    emulator_name: String,
}

impl ShareOrchestrator {
    pub fn new(
        picker: Arc<dyn BinaryPicker>,
        metadata: Arc<dyn MetadataResolver>,
        remote: Arc<dyn ShaderRemote>,
        uploader: Arc<dyn ArchiveUploader>,
    ) -> Self {
        Self {
            picker,
            metadata,
            remote,
            uploader,
            emulator_name: "ryujinx".to_string(),
        }
    }

    /// Substring the chosen binary's file name must contain
    pub fn with_emulator_name(mut self, name: impl Into<String>) -> Self {
        self.emulator_name = name.into();
        self
    }

    pub async fn share(
        &self,
        request: &ShareRequest,
        sink: &dyn ProgressSink,
    ) -> Result<ShareReceipt, ShareFailure> {
        let title = &request.title;

        let binary = self
            .picker
            .pick_binary()
            .await
            .ok_or(ShareFailure::OperationCanceled)?;
        if !is_emulator_binary(&binary, &self.emulator_name) {
            return Err(ShareFailure::InvalidEmulatorBinary {
                path: binary,
                expected: self.emulator_name.clone(),
            });
        }

        emulator_config::enable_logging(&request.data_root).await?;

        let metadata = match self.metadata.resolve(title).await {
            Ok(metadata) => metadata,
            Err(e) => {
                debug!("No metadata for {}: {}", title, e);
                TitleMetadata::fallback(title)
            }
        };

        let report = match ProcessSupervisor::new(&binary).run().await? {
            SupervisionOutcome::Resolved(report) => report,
            SupervisionOutcome::Exited => return Err(ShareFailure::NoObservation),
        };
        info!(
            "Emulator ran {} with {} shaders",
            report.ran_title_id, report.compiled_shaders
        );

        let validated = validate_run(report, title, request.local_count, &metadata)?;

        let archive = pack_shaders(&request.data_root, title).await?;
        let response = self
            .uploader
            .upload(&archive, title, sink)
            .await
            .ok_or(ShareFailure::UploadFailed)?;
        let short_link = response.short_link().to_string();

        let report = validated.report;
        let announcement = Announcement {
            app_version: env!("CARGO_PKG_VERSION"),
            title_name: metadata.display_name(),
            title,
            emulator_version: report.emulator_version.as_deref(),
            local_count: request.local_count,
            remote_count: request.remote_count,
            short_link: &short_link,
        }
        .to_string();

        // Not fatal once the upload has succeeded.
        if let Err(e) = self.remote.post_announcement(&announcement).await {
            warn!("Failed to post share announcement: {}", e);
        }

        Ok(ShareReceipt {
            report,
            archive,
            short_link,
            announcement,
        })
    }
}
