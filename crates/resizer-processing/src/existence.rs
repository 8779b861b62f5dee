use resizer_core::DerivedKey;
use resizer_storage::{Storage, StorageError};
use std::sync::Arc;

/// Answers "has this key already been computed?" with a metadata lookup.
///
/// Lookup failures other than not-found are logged and reported as absent, so a flaky
/// store degrades to recomputation instead of failing the request.
#[derive(Clone)]
pub struct ExistenceChecker {
    storage: Arc<dyn Storage>,
}

impl ExistenceChecker {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    pub async fn exists(&self, key: &DerivedKey) -> bool {
        match self.storage.head(&key.object_key).await {
            Ok(meta) => {
                tracing::debug!(
                    bucket = %self.storage.bucket(),
                    object_key = %key.object_key,
                    size_bytes = ?meta.size_bytes,
                    "Object already exists"
                );
                true
            }
            Err(StorageError::NotFound(_)) => false,
            Err(e) => {
                tracing::warn!(
                    bucket = %self.storage.bucket(),
                    object_key = %key.object_key,
                    error = %e,
                    "Metadata check failed, treating object as absent"
                );
                false
            }
        }
    }
}
