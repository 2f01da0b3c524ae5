//! Packaging a local shader cache for upload

use crate::archive::ArchiveBuilder;
use crate::error::{ShaderkitError, ShaderkitResult};
use crate::title::{CachePaths, TitleId};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Bundle `cache.zip` and `cache.info` into `upload.zip` next to them.
///
/// Both sources must exist.
pub async fn pack_shaders(data_root: &Path, title: &TitleId) -> ShaderkitResult<PathBuf> {
    let paths = CachePaths::new(data_root, title);
    let dest = paths.upload_artifact();
    let sources = [paths.archive(), paths.info()];

    let mut builder = ArchiveBuilder::new();
    for source in &sources {
        let exists = tokio::fs::try_exists(source)
            .await
            .map_err(|e| ShaderkitError::io(format!("checking {}", source.display()), e))?;
        if !exists {
            return Err(ShaderkitError::archive_write(
                &dest,
                format!("missing {}", source.display()),
            ));
        }
        builder.add_local_file(source);
    }

    builder.write(&dest).await?;
    debug!("Packed shader cache for {} into {}", title, dest.display());
    Ok(dest)
}
