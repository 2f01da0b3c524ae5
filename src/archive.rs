//! Zip container access for shader caches
//!
//! The zip codec is synchronous, so every call here runs on tokio's
//! blocking pool and returns once the file handle has been released.

use crate::error::{ShaderkitError, ShaderkitResult};
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// One entry read back from an archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: String,
    pub data: Vec<u8>,
}

/// Stages local files and writes them into a fresh archive
#[derive(Debug, Default)]
pub struct ArchiveBuilder {
    files: Vec<PathBuf>,
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage a file. It is stored at the archive root under its base name.
    pub fn add_local_file(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.files.push(path.into());
        self
    }

    /// Write the archive to `dest`, returning once it is synced to disk
    pub async fn write(self, dest: &Path) -> ShaderkitResult<()> {
        let dest = dest.to_path_buf();
        tokio::task::spawn_blocking(move || write_blocking(&self.files, &dest))
            .await
            .map_err(|e| ShaderkitError::Internal(format!("archive task failed: {}", e)))?
    }
}

fn write_blocking(files: &[PathBuf], dest: &Path) -> ShaderkitResult<()> {
    let out = File::create(dest).map_err(|e| ShaderkitError::archive_write(dest, e))?;
    let mut writer = ZipWriter::new(out);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for path in files {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| ShaderkitError::archive_write(dest, format!("{} has no file name", path.display())))?;

        let mut data = Vec::new();
        File::open(path)
            .and_then(|mut f| f.read_to_end(&mut data))
            .map_err(|e| ShaderkitError::archive_write(dest, format!("{}: {}", path.display(), e)))?;

        writer
            .start_file(name.as_str(), options)
            .map_err(|e| ShaderkitError::archive_write(dest, e))?;
        writer
            .write_all(&data)
            .map_err(|e| ShaderkitError::archive_write(dest, e))?;
        debug!("Added {} ({} bytes) to {}", name, data.len(), dest.display());
    }

    let out = writer
        .finish()
        .map_err(|e| ShaderkitError::archive_write(dest, e))?;
    out.sync_all()
        .map_err(|e| ShaderkitError::archive_write(dest, e))?;
    Ok(())
}

/// Count the logical entries of an existing archive
pub async fn entry_count(path: &Path) -> ShaderkitResult<usize> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || open_archive(&path).map(|archive| archive.len()))
        .await
        .map_err(|e| ShaderkitError::Internal(format!("archive task failed: {}", e)))?
}

/// Read every entry of an archive into memory
pub async fn read_entries(path: &Path) -> ShaderkitResult<Vec<ArchiveEntry>> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || {
        let mut archive = open_archive(&path)?;
        let mut entries = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut file = archive.by_index(i).map_err(|e| corrupt(&path, e))?;
            let mut data = Vec::new();
            file.read_to_end(&mut data).map_err(|e| corrupt(&path, e))?;
            entries.push(ArchiveEntry {
                name: file.name().to_string(),
                data,
            });
        }
        Ok(entries)
    })
    .await
    .map_err(|e| ShaderkitError::Internal(format!("archive task failed: {}", e)))?
}

fn open_archive(path: &Path) -> ShaderkitResult<ZipArchive<BufReader<File>>> {
    let file = File::open(path).map_err(|e| corrupt(path, e))?;
    ZipArchive::new(BufReader::new(file)).map_err(|e| corrupt(path, e))
}

fn corrupt(path: &Path, reason: impl ToString) -> ShaderkitError {
    ShaderkitError::ArchiveCorrupt {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}
