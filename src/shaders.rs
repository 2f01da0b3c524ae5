//! Local shader cache queries

use crate::archive;
use crate::title::{CachePaths, TitleId};
use std::path::Path;
use tracing::debug;

/// Number of shader entries cached locally for `title`.
///
/// Counting is advisory: a missing or unreadable archive counts as zero.
pub async fn count_shaders(title: &TitleId, data_root: &Path) -> u64 {
    let path = CachePaths::new(data_root, title).archive();

    match tokio::fs::try_exists(&path).await {
        Ok(true) => {}
        Ok(false) => return 0,
        Err(e) => {
            debug!("Cannot stat {}: {}", path.display(), e);
            return 0;
        }
    }

    match archive::entry_count(&path).await {
        Ok(count) => count as u64,
        Err(e) => {
            debug!("Ignoring unreadable shader archive for {}: {}", title, e);
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::ArchiveBuilder;
    use tempfile::TempDir;

    fn title() -> TitleId {
        TitleId::new("0100ABCD").unwrap()
    }

    #[tokio::test]
    async fn missing_archive_counts_zero() {
        let dir = TempDir::new().unwrap();
        assert_eq!(count_shaders(&title(), dir.path()).await, 0);
    }

    #[tokio::test]
    async fn corrupt_archive_counts_zero() {
        let dir = TempDir::new().unwrap();
        let paths = CachePaths::new(dir.path(), &title());
        std::fs::create_dir_all(paths.program_dir()).unwrap();
        std::fs::write(paths.archive(), b"PK\x03\x04truncated").unwrap();

        assert_eq!(count_shaders(&title(), dir.path()).await, 0);
    }

    #[tokio::test]
    async fn counts_every_entry() {
        let dir = TempDir::new().unwrap();
        let paths = CachePaths::new(dir.path(), &title());
        std::fs::create_dir_all(paths.program_dir()).unwrap();

        let staging = dir.path().join("staging");
        std::fs::create_dir_all(&staging).unwrap();
        let mut builder = ArchiveBuilder::new();
        for i in 0..7 {
            let shader = staging.join(format!("{:08x}", i));
            std::fs::write(&shader, vec![i as u8; 32]).unwrap();
            builder.add_local_file(shader);
        }
        builder.write(&paths.archive()).await.unwrap();

        assert_eq!(count_shaders(&title(), dir.path()).await, 7);
    }

    #[tokio::test]
    async fn lookup_ignores_title_case() {
        let dir = TempDir::new().unwrap();
        let upper = TitleId::new("0100ABCD").unwrap();
        let paths = CachePaths::new(dir.path(), &upper);
        std::fs::create_dir_all(paths.program_dir()).unwrap();
        let src = dir.path().join("00000001");
        std::fs::write(&src, b"x").unwrap();
        let mut builder = ArchiveBuilder::new();
        builder.add_local_file(src);
        builder.write(&paths.archive()).await.unwrap();

        let lower = TitleId::new("0100abcd").unwrap();
        assert_eq!(count_shaders(&lower, dir.path()).await, 1);
    }
}
