use crate::staging::StagedUpload;
use crate::traits::{ObjectMetadata, Storage, StorageError, StorageResult, Visibility};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use resizer_core::constants::OUTPUT_EXTENSION;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

/// Local filesystem storage implementation
///
/// Objects are plain files under `base_path`. Visibility is not enforced here; whatever
/// serves the directory decides who can read it.
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    root_display: String,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for object storage (e.g., "/var/lib/resizer")
    pub async fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        let root_display = base_path.display().to_string();
        Ok(LocalStorage {
            base_path,
            root_display,
        })
    }

    /// Convert object key to filesystem path
    ///
    /// Only plain relative components are accepted so a key can never resolve outside
    /// the storage directory.
    fn key_to_path(&self, object_key: &str) -> StorageResult<PathBuf> {
        if object_key.is_empty() {
            return Err(StorageError::InvalidKey("Storage key is empty".to_string()));
        }

        let key_path = Path::new(object_key);
        if !key_path
            .components()
            .all(|component| matches!(component, Component::Normal(_)))
        {
            return Err(StorageError::InvalidKey(format!(
                "Storage key contains invalid components: {}",
                object_key
            )));
        }

        Ok(self.base_path.join(key_path))
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn head(&self, object_key: &str) -> StorageResult<ObjectMetadata> {
        let path = self.key_to_path(object_key)?;

        match fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(ObjectMetadata {
                size_bytes: Some(meta.len()),
                content_type: None,
            }),
            Ok(_) => Err(StorageError::NotFound(object_key.to_string())),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(StorageError::NotFound(object_key.to_string()))
            }
            Err(e) => Err(StorageError::BackendError(format!(
                "Failed to stat {}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn put(
        &self,
        object_key: &str,
        data: Bytes,
        _content_type: &str,
        visibility: Visibility,
    ) -> StorageResult<()> {
        let path = self.key_to_path(object_key)?;
        let parent = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.base_path.clone());
        let start = std::time::Instant::now();

        fs::create_dir_all(&parent).await?;

        // Write beside the destination, then rename: readers never observe a partial file.
        let staged = StagedUpload::stage_in(&parent, &data, OUTPUT_EXTENSION).await?;
        let size = staged.size_bytes();
        staged.persist(&path).await?;

        tracing::info!(
            path = %path.display(),
            key = %object_key,
            size_bytes = size,
            visibility = ?visibility,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload successful"
        );

        Ok(())
    }

    fn bucket(&self) -> &str {
        &self.root_display
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}
