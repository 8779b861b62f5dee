//! In-memory collaborators for testing the pipeline without network or S3

use crate::error::{FetchError, TransformError};
use crate::fetcher::ImageFetcher;
use crate::image::ImageTransformer;
use async_trait::async_trait;
use bytes::Bytes;
use image::{DynamicImage, Rgb, RgbImage};
use resizer_storage::{
    ObjectMetadata, Storage, StorageBackend, StorageError, StorageResult, Visibility,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Object written through [`MemoryStorage::put`]
#[derive(Debug, Clone)]
pub struct StoredEntry {
    pub data: Vec<u8>,
    pub content_type: String,
    pub visibility: Visibility,
}

/// Mock storage implementation that keeps objects in memory
#[derive(Default)]
pub struct MemoryStorage {
    objects: Mutex<HashMap<String, StoredEntry>>,
    fail_head: bool,
    fail_put: bool,
    head_calls: AtomicUsize,
    put_calls: AtomicUsize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `head` returns a backend error.
    pub fn failing_head(mut self) -> Self {
        self.fail_head = true;
        self
    }

    /// Every `put` returns an upload error and writes nothing.
    pub fn failing_put(mut self) -> Self {
        self.fail_put = true;
        self
    }

    /// Seed an object without counting a put
    pub fn insert(&self, object_key: &str, data: &[u8]) {
        self.objects.lock().unwrap().insert(
            object_key.to_string(),
            StoredEntry {
                data: data.to_vec(),
                content_type: resizer_core::constants::OUTPUT_CONTENT_TYPE.to_string(),
                visibility: Visibility::PublicRead,
            },
        );
    }

    pub fn get(&self, object_key: &str) -> Option<StoredEntry> {
        self.objects.lock().unwrap().get(object_key).cloned()
    }

    pub fn contains(&self, object_key: &str) -> bool {
        self.objects.lock().unwrap().contains_key(object_key)
    }

    pub fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn head_calls(&self) -> usize {
        self.head_calls.load(Ordering::SeqCst)
    }

    pub fn put_calls(&self) -> usize {
        self.put_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn head(&self, object_key: &str) -> StorageResult<ObjectMetadata> {
        self.head_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_head {
            return Err(StorageError::BackendError("head unavailable".to_string()));
        }

        self.objects
            .lock()
            .unwrap()
            .get(object_key)
            .map(|entry| ObjectMetadata {
                size_bytes: Some(entry.data.len() as u64),
                content_type: Some(entry.content_type.clone()),
            })
            .ok_or_else(|| StorageError::NotFound(object_key.to_string()))
    }

    async fn put(
        &self,
        object_key: &str,
        data: Bytes,
        content_type: &str,
        visibility: Visibility,
    ) -> StorageResult<()> {
        self.put_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_put {
            return Err(StorageError::UploadFailed("put rejected".to_string()));
        }

        self.objects.lock().unwrap().insert(
            object_key.to_string(),
            StoredEntry {
                data: data.to_vec(),
                content_type: content_type.to_string(),
                visibility,
            },
        );
        Ok(())
    }

    fn bucket(&self) -> &str {
        "memory"
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

/// Fetcher returning a fixed solid image (or always failing), counting calls
pub struct StaticFetcher {
    image: Option<DynamicImage>,
    calls: AtomicUsize,
}

impl StaticFetcher {
    pub fn solid(width: u32, height: u32) -> Self {
        Self {
            image: Some(DynamicImage::ImageRgb8(RgbImage::from_pixel(
                width,
                height,
                Rgb([90, 160, 40]),
            ))),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            image: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageFetcher for StaticFetcher {
    async fn fetch(&self, location: &str) -> Result<DynamicImage, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.image
            .clone()
            .ok_or_else(|| FetchError::new(location, "source unavailable"))
    }
}

/// Wraps another transformer (or always fails), counting calls
pub struct CountingTransformer<T> {
    inner: Option<T>,
    calls: AtomicUsize,
}

impl<T: ImageTransformer> CountingTransformer<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner: Some(inner),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            inner: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<T: ImageTransformer> ImageTransformer for CountingTransformer<T> {
    async fn resize(
        &self,
        image: DynamicImage,
        width: u32,
        height: u32,
    ) -> Result<Bytes, TransformError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.inner {
            Some(inner) => inner.resize(image, width, height).await,
            None => Err(TransformError::Task("transformer unavailable".to_string())),
        }
    }
}
