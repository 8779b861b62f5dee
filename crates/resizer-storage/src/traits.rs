//! Storage abstraction trait
//!
//! The pipeline only ever asks two things of a store: "is there an object at this key?"
//! and "write these bytes at this key". Everything else a backend can do stays behind
//! the implementation.

use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Staging failed: {0}")]
    Staging(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Access policy applied to a written object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    Private,
    /// Readable by anyone through the object's location.
    #[default]
    PublicRead,
}

/// Metadata returned by a successful lookup
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ObjectMetadata {
    pub size_bytes: Option<u64>,
    pub content_type: Option<String>,
}

/// Storage abstraction trait
///
/// Implementations are constructed once per process and shared behind an `Arc`; they
/// must not mutate shared state after construction.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Look up object metadata. Absence is reported as [`StorageError::NotFound`].
    async fn head(&self, object_key: &str) -> StorageResult<ObjectMetadata>;

    /// Write `data` at `object_key`, replacing any existing object.
    ///
    /// A failed put must not leave a readable object behind.
    async fn put(
        &self,
        object_key: &str,
        data: Bytes,
        content_type: &str,
        visibility: Visibility,
    ) -> StorageResult<()>;

    /// Bucket (or root directory) this store writes to, for diagnostics.
    fn bucket(&self) -> &str;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
