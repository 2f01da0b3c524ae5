//! Installing a community shader cache

use super::cancel::CancelRegistry;
use super::progress::{ProgressSink, ProgressTracker};
use super::TransferOutcome;
use crate::error::{ShaderkitError, ShaderkitResult};
use crate::remote::ShaderRemote;
use crate::title::{CachePaths, TitleId};
use futures_util::StreamExt;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;
use tokio::fs;
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// How the body copy ended when it did not fail
enum BodyEnd {
    Complete(u64),
    Cancelled(u64),
}

/// Downloads shader caches into the emulator's data directory
pub struct Downloader {
    remote: Arc<dyn ShaderRemote>,
    cancels: CancelRegistry,
}

impl Downloader {
    pub fn new(remote: Arc<dyn ShaderRemote>) -> Self {
        Self::with_registry(remote, CancelRegistry::new())
    }

    /// Use an existing registry, e.g. one shared with a signal handler
    pub fn with_registry(remote: Arc<dyn ShaderRemote>, cancels: CancelRegistry) -> Self {
        Self { remote, cancels }
    }

    pub fn registry(&self) -> &CancelRegistry {
        &self.cancels
    }

    /// Abort the in-flight install of `title`, if any
    pub fn cancel(&self, title: &TitleId) -> bool {
        self.cancels.cancel(title)
    }

    /// Download and install the shared cache for `title`.
    ///
    /// A sidecar written before a failed or cancelled body stays on disk;
    /// running install again replaces it.
    pub async fn install(
        &self,
        title: &TitleId,
        data_root: &Path,
        sink: &dyn ProgressSink,
    ) -> TransferOutcome {
        let paths = CachePaths::new(data_root, title);

        if let Err(e) = fs::create_dir_all(paths.program_dir()).await {
            return failed(title, ShaderkitError::io("creating shader directory", e));
        }

        let info = match self.remote.fetch_info(title).await {
            Ok(Some(bytes)) if !bytes.is_empty() => bytes,
            Ok(_) => {
                info!("No shared shader cache published for {}", title);
                return TransferOutcome::Failed(format!("no shader cache available for {}", title));
            }
            Err(e) => return failed(title, e),
        };

        if let Err(e) = prepare_fresh_install(&paths, &info).await {
            return failed(title, e);
        }

        let guard = self.cancels.register(title);
        match self.copy_body(title, &paths, guard.token(), sink).await {
            Ok(BodyEnd::Complete(bytes)) => {
                debug!("Wrote {} bytes to {}", bytes, paths.archive().display());
            }
            Ok(BodyEnd::Cancelled(bytes)) => {
                info!("Download of {} cancelled after {} bytes", title, bytes);
                return TransferOutcome::Cancelled;
            }
            Err(e) => return failed(title, e),
        }
        drop(guard);

        if let Err(e) = empty_dir(&paths.legacy_dir()).await {
            return failed(title, e);
        }

        info!("Installed shader cache for {}", title);
        TransferOutcome::Success
    }

    async fn copy_body(
        &self,
        title: &TitleId,
        paths: &CachePaths,
        token: &CancellationToken,
        sink: &dyn ProgressSink,
    ) -> ShaderkitResult<BodyEnd> {
        let archive = tokio::select! {
            biased;
            _ = token.cancelled() => return Ok(BodyEnd::Cancelled(0)),
            archive = self.remote.fetch_archive(title) => archive?,
        };

        let dest = paths.archive();
        let file = fs::File::create(&dest)
            .await
            .map_err(|e| ShaderkitError::io(format!("creating {}", dest.display()), e))?;
        let mut writer = BufWriter::new(file);
        let mut tracker = ProgressTracker::new(title.clone(), archive.total_length.unwrap_or(0));
        let mut body = archive.body;

        loop {
            let next = tokio::select! {
                biased;
                _ = token.cancelled() => {
                    // Keep what already arrived on disk.
                    let _ = writer.flush().await;
                    return Ok(BodyEnd::Cancelled(tracker.transferred()));
                }
                next = body.next() => next,
            };

            match next {
                Some(Ok(chunk)) => {
                    tracker.record(chunk.len(), sink);
                    writer
                        .write_all(&chunk)
                        .await
                        .map_err(|e| ShaderkitError::io(format!("writing {}", dest.display()), e))?;
                }
                Some(Err(e)) => {
                    let _ = writer.flush().await;
                    return Err(ShaderkitError::io("reading archive body", e));
                }
                None => break,
            }
        }

        writer
            .flush()
            .await
            .map_err(|e| ShaderkitError::io(format!("flushing {}", dest.display()), e))?;
        writer
            .get_ref()
            .sync_all()
            .await
            .map_err(|e| ShaderkitError::io(format!("syncing {}", dest.display()), e))?;

        Ok(BodyEnd::Complete(tracker.transferred()))
    }
}

fn failed(title: &TitleId, error: ShaderkitError) -> TransferOutcome {
    warn!("Shader download for {} failed: {}", title, error);
    TransferOutcome::Failed(error.to_string())
}

/// Drop derived caches and write the new sidecar
async fn prepare_fresh_install(paths: &CachePaths, info: &[u8]) -> ShaderkitResult<()> {
    remove_dir_if_present(&paths.legacy_dir()).await?;
    let dest = paths.info();
    fs::write(&dest, info)
        .await
        .map_err(|e| ShaderkitError::io(format!("writing {}", dest.display()), e))
}

async fn remove_dir_if_present(dir: &Path) -> ShaderkitResult<()> {
    match fs::remove_dir_all(dir).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(ShaderkitError::io(format!("removing {}", dir.display()), e)),
    }
}

async fn empty_dir(dir: &Path) -> ShaderkitResult<()> {
    remove_dir_if_present(dir).await?;
    fs::create_dir_all(dir)
        .await
        .map_err(|e| ShaderkitError::io(format!("creating {}", dir.display()), e))
}
