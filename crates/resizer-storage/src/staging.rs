//! Local staging of encoded bytes before upload.
//!
//! A [`StagedUpload`] owns a temporary file that is removed when the value is dropped,
//! so every exit path of an upload (success, error, early return) cleans up after
//! itself. Creating and renaming the file are blocking calls and run on the blocking
//! pool; the unlink on drop stays inline.

use crate::traits::{StorageError, StorageResult};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;

pub struct StagedUpload {
    file: NamedTempFile,
    size_bytes: u64,
}

impl StagedUpload {
    /// Stage `data` in the system temp directory.
    pub async fn stage(data: &[u8], extension: &str) -> StorageResult<Self> {
        Self::stage_in(std::env::temp_dir(), data, extension).await
    }

    /// Stage `data` in `dir`. Staging next to the final destination keeps the later
    /// rename on one filesystem.
    pub async fn stage_in(
        dir: impl Into<PathBuf>,
        data: &[u8],
        extension: &str,
    ) -> StorageResult<Self> {
        let dir = dir.into();
        let suffix = format!(".{}", extension);

        let (file, handle) = tokio::task::spawn_blocking(move || create_temp_file(&dir, &suffix))
            .await
            .map_err(|e| StorageError::Staging(format!("Staging task failed: {}", e)))??;
        let mut handle = tokio::fs::File::from_std(handle);

        handle.write_all(data).await.map_err(|e| {
            StorageError::Staging(format!(
                "Failed to write temp file {}: {}",
                file.path().display(),
                e
            ))
        })?;
        handle.sync_all().await.map_err(|e| {
            StorageError::Staging(format!(
                "Failed to sync temp file {}: {}",
                file.path().display(),
                e
            ))
        })?;

        Ok(StagedUpload {
            file,
            size_bytes: data.len() as u64,
        })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// Atomically move the staged file to `destination`, consuming the guard.
    pub async fn persist(self, destination: &Path) -> StorageResult<()> {
        let destination = destination.to_path_buf();
        let file = self.file;
        tokio::task::spawn_blocking(move || {
            file.persist(&destination).map_err(|e| {
                StorageError::UploadFailed(format!(
                    "Failed to move staged file to {}: {}",
                    destination.display(),
                    e.error
                ))
            })
        })
        .await
        .map_err(|e| StorageError::UploadFailed(format!("Persist task failed: {}", e)))??;
        Ok(())
    }
}

fn create_temp_file(dir: &Path, suffix: &str) -> StorageResult<(NamedTempFile, std::fs::File)> {
    let file = tempfile::Builder::new()
        .prefix(".staging-")
        .suffix(suffix)
        .tempfile_in(dir)
        .map_err(|e| {
            StorageError::Staging(format!(
                "Failed to create temp file in {}: {}",
                dir.display(),
                e
            ))
        })?;

    let handle = file.reopen().map_err(|e| {
        StorageError::Staging(format!(
            "Failed to open temp file {}: {}",
            file.path().display(),
            e
        ))
    })?;

    Ok((file, handle))
}
