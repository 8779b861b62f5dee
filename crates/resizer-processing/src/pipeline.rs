//! End-to-end resize pipeline
//!
//! `derive key -> exists? -> fetch -> resize -> store`, short-circuiting on a hit. Every
//! stage failure is folded into a [`ResizeOutcome::Failed`]; diagnostics go to the log,
//! never into the outcome.

use crate::existence::ExistenceChecker;
use crate::fetcher::{HttpImageFetcher, ImageFetcher};
use crate::image::{GifTransformer, ImageTransformer};
use resizer_core::constants::OUTPUT_CONTENT_TYPE;
use resizer_core::{FailureKind, KeyDeriver, ResizeOutcome, ResizeRequest};
use resizer_storage::{Storage, Visibility};
use std::sync::Arc;
use std::time::Instant;

/// Sequences the pipeline stages for one request at a time.
///
/// Holds only shared, immutable collaborators, so one instance serves concurrent
/// requests. Two concurrent misses on the same key both compute and both write; the
/// last put wins.
#[derive(Clone)]
pub struct PipelineOrchestrator {
    keys: KeyDeriver,
    storage: Arc<dyn Storage>,
    existence: ExistenceChecker,
    fetcher: Arc<dyn ImageFetcher>,
    transformer: Arc<dyn ImageTransformer>,
}

impl PipelineOrchestrator {
    pub fn new(
        keys: KeyDeriver,
        storage: Arc<dyn Storage>,
        fetcher: Arc<dyn ImageFetcher>,
        transformer: Arc<dyn ImageTransformer>,
    ) -> Self {
        Self {
            keys,
            existence: ExistenceChecker::new(storage.clone()),
            storage,
            fetcher,
            transformer,
        }
    }

    /// Orchestrator with the GIF transformer and the given HTTP fetcher.
    pub fn with_fetcher(
        keys: KeyDeriver,
        storage: Arc<dyn Storage>,
        fetcher: HttpImageFetcher,
    ) -> Self {
        Self::new(keys, storage, Arc::new(fetcher), Arc::new(GifTransformer))
    }

    pub fn key_deriver(&self) -> &KeyDeriver {
        &self.keys
    }

    #[tracing::instrument(
        skip(self, request),
        fields(
            url = %request.url,
            width = request.width,
            height = request.height,
            object_key = tracing::field::Empty,
        )
    )]
    pub async fn handle(&self, request: &ResizeRequest) -> ResizeOutcome {
        let start = Instant::now();
        let key = self.keys.derive(&request.url, request.width, request.height);
        tracing::Span::current().record("object_key", key.object_key.as_str());

        if self.existence.exists(&key).await {
            tracing::info!(
                location = %key.location,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Resized image already stored"
            );
            return ResizeOutcome::Cached {
                location: key.location,
            };
        }

        let stage = Instant::now();
        let image = match self.fetcher.fetch(&request.url).await {
            Ok(image) => image,
            Err(e) => {
                tracing::error!(
                    location = %e.location,
                    error = %e.message,
                    "Failed to read original image"
                );
                return ResizeOutcome::Failed {
                    kind: FailureKind::Fetch,
                };
            }
        };
        tracing::debug!(
            duration_ms = stage.elapsed().as_secs_f64() * 1000.0,
            "Fetched original image"
        );

        let stage = Instant::now();
        let encoded = match self
            .transformer
            .resize(image, request.width, request.height)
            .await
        {
            Ok(encoded) => encoded,
            Err(e) => {
                tracing::error!(error = %e, "Failed to resize image");
                return ResizeOutcome::Failed {
                    kind: FailureKind::Resize,
                };
            }
        };
        tracing::debug!(
            size_bytes = encoded.len(),
            duration_ms = stage.elapsed().as_secs_f64() * 1000.0,
            "Resized image"
        );

        let stage = Instant::now();
        if let Err(e) = self
            .storage
            .put(
                &key.object_key,
                encoded,
                OUTPUT_CONTENT_TYPE,
                Visibility::PublicRead,
            )
            .await
        {
            tracing::error!(
                bucket = %self.storage.bucket(),
                error = %e,
                "Failed to store resized image"
            );
            return ResizeOutcome::Failed {
                kind: FailureKind::Store,
            };
        }

        tracing::info!(
            location = %key.location,
            store_ms = stage.elapsed().as_secs_f64() * 1000.0,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Resized image stored"
        );

        ResizeOutcome::Stored {
            location: key.location,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{CountingTransformer, MemoryStorage, StaticFetcher};
    use resizer_core::FingerprintScheme;
    use resizer_storage::LocalStorage;

    const CAT: &str = "https://cdn.example.com/img/cat.jpg";
    const CAT_LOCATION: &str = "https://out.example.com/cat.jpg-114832261-100-50";

    struct Harness {
        storage: Arc<MemoryStorage>,
        fetcher: Arc<StaticFetcher>,
        transformer: Arc<CountingTransformer<GifTransformer>>,
        pipeline: PipelineOrchestrator,
    }

    fn harness(
        storage: MemoryStorage,
        fetcher: StaticFetcher,
        transformer: CountingTransformer<GifTransformer>,
    ) -> Harness {
        let storage = Arc::new(storage);
        let fetcher = Arc::new(fetcher);
        let transformer = Arc::new(transformer);
        let pipeline = PipelineOrchestrator::new(
            KeyDeriver::new("https://out.example.com/", FingerprintScheme::Legacy),
            storage.clone(),
            fetcher.clone(),
            transformer.clone(),
        );
        Harness {
            storage,
            fetcher,
            transformer,
            pipeline,
        }
    }

    fn healthy() -> Harness {
        harness(
            MemoryStorage::new(),
            StaticFetcher::solid(400, 200),
            CountingTransformer::new(GifTransformer),
        )
    }

    #[tokio::test]
    async fn miss_fetches_resizes_and_stores() {
        let h = healthy();

        let outcome = h.pipeline.handle(&ResizeRequest::new(CAT, 100, 50)).await;

        assert_eq!(
            outcome,
            ResizeOutcome::Stored {
                location: CAT_LOCATION.to_string()
            }
        );
        assert_eq!(outcome.message(), CAT_LOCATION);

        let entry = h.storage.get("cat.jpg-114832261-100-50").unwrap();
        assert_eq!(entry.content_type, "image/gif");
        assert_eq!(entry.visibility, Visibility::PublicRead);
        let stored = image::load_from_memory(&entry.data).unwrap();
        assert_eq!((stored.width(), stored.height()), (100, 50));
    }

    #[tokio::test]
    async fn hit_short_circuits_all_work() {
        let h = healthy();
        h.storage.insert("cat.jpg-114832261-100-50", b"GIF89a");

        let outcome = h.pipeline.handle(&ResizeRequest::new(CAT, 100, 50)).await;

        assert_eq!(
            outcome,
            ResizeOutcome::Cached {
                location: CAT_LOCATION.to_string()
            }
        );
        assert_eq!(h.fetcher.calls(), 0);
        assert_eq!(h.transformer.calls(), 0);
        assert_eq!(h.storage.put_calls(), 0);
    }

    #[tokio::test]
    async fn second_identical_request_does_no_work() {
        let h = healthy();
        let request = ResizeRequest::new(CAT, 100, 50);

        let first = h.pipeline.handle(&request).await;
        let second = h.pipeline.handle(&request).await;

        assert_eq!(first.location(), second.location());
        assert!(matches!(second, ResizeOutcome::Cached { .. }));
        assert_eq!(h.fetcher.calls(), 1);
        assert_eq!(h.transformer.calls(), 1);
        assert_eq!(h.storage.put_calls(), 1);
    }

    #[tokio::test]
    async fn different_dimensions_produce_distinct_objects() {
        let h = healthy();

        let a = h.pipeline.handle(&ResizeRequest::new(CAT, 100, 50)).await;
        let b = h.pipeline.handle(&ResizeRequest::new(CAT, 100, 51)).await;
        let c = h.pipeline.handle(&ResizeRequest::new(CAT, 80, 50)).await;

        assert_ne!(a.location(), b.location());
        assert_ne!(a.location(), c.location());
        assert_eq!(h.storage.len(), 3);
    }

    #[tokio::test]
    async fn fetch_failure_skips_transform_and_store() {
        let h = harness(
            MemoryStorage::new(),
            StaticFetcher::failing(),
            CountingTransformer::new(GifTransformer),
        );

        let outcome = h.pipeline.handle(&ResizeRequest::new(CAT, 100, 50)).await;

        assert_eq!(outcome.message(), "Failed to read Original Image");
        assert_eq!(h.transformer.calls(), 0);
        assert_eq!(h.storage.put_calls(), 0);
    }

    #[tokio::test]
    async fn resize_failure_skips_store() {
        let h = harness(
            MemoryStorage::new(),
            StaticFetcher::solid(10, 10),
            CountingTransformer::failing(),
        );

        let outcome = h.pipeline.handle(&ResizeRequest::new(CAT, 100, 50)).await;

        assert_eq!(outcome.message(), "Failed to resize Image");
        assert_eq!(h.fetcher.calls(), 1);
        assert_eq!(h.storage.put_calls(), 0);
    }

    #[tokio::test]
    async fn zero_dimension_is_a_resize_failure() {
        let h = healthy();

        let outcome = h.pipeline.handle(&ResizeRequest::new(CAT, 0, 50)).await;

        assert_eq!(outcome.failure(), Some(FailureKind::Resize));
        assert!(h.storage.is_empty());
    }

    #[tokio::test]
    async fn oversized_target_is_a_resize_failure() {
        let h = healthy();

        let outcome = h
            .pipeline
            .handle(&ResizeRequest::new(CAT, 65_536, 65_536))
            .await;

        assert_eq!(outcome.failure(), Some(FailureKind::Resize));
        assert_eq!(h.transformer.calls(), 1);
        assert!(h.storage.is_empty());
    }

    #[tokio::test]
    async fn local_files_are_not_fetched_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("secret.png");
        image::RgbImage::from_pixel(4, 4, image::Rgb([1, 2, 3]))
            .save(&source)
            .unwrap();
        let location = url::Url::from_file_path(&source).unwrap().to_string();

        let storage = Arc::new(MemoryStorage::new());
        let pipeline = PipelineOrchestrator::with_fetcher(
            KeyDeriver::new("https://out.example.com/", FingerprintScheme::Legacy),
            storage.clone(),
            HttpImageFetcher::new().unwrap(),
        );

        let outcome = pipeline.handle(&ResizeRequest::new(location, 10, 10)).await;

        assert_eq!(outcome.failure(), Some(FailureKind::Fetch));
        assert!(storage.is_empty());
    }

    #[tokio::test]
    async fn store_failure_leaves_nothing_behind() {
        let h = harness(
            MemoryStorage::new().failing_put(),
            StaticFetcher::solid(400, 200),
            CountingTransformer::new(GifTransformer),
        );
        let request = ResizeRequest::new(CAT, 100, 50);

        let outcome = h.pipeline.handle(&request).await;
        assert_eq!(outcome.message(), "Failed to store image in S3");
        assert!(!h.storage.contains("cat.jpg-114832261-100-50"));
        let key = h.pipeline.key_deriver().derive(CAT, 100, 50);
        assert!(!ExistenceChecker::new(h.storage.clone()).exists(&key).await);

        // Nothing was cached, so the next attempt recomputes.
        let retry = h.pipeline.handle(&request).await;
        assert_eq!(retry.failure(), Some(FailureKind::Store));
        assert_eq!(h.fetcher.calls(), 2);
    }

    #[tokio::test]
    async fn metadata_failure_falls_through_to_compute() {
        let h = harness(
            MemoryStorage::new().failing_head(),
            StaticFetcher::solid(400, 200),
            CountingTransformer::new(GifTransformer),
        );
        h.storage.insert("cat.jpg-114832261-100-50", b"stale");

        let outcome = h.pipeline.handle(&ResizeRequest::new(CAT, 100, 50)).await;

        assert!(matches!(outcome, ResizeOutcome::Stored { .. }));
        assert_eq!(h.fetcher.calls(), 1);
        assert_eq!(h.storage.put_calls(), 1);
    }

    #[tokio::test]
    async fn unparsable_source_reports_fetch_failure() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Arc::new(LocalStorage::new(dir.path()).await.unwrap());
        let pipeline = PipelineOrchestrator::with_fetcher(
            KeyDeriver::new("https://out.example.com/", FingerprintScheme::Legacy),
            storage,
            HttpImageFetcher::new().unwrap(),
        );

        let outcome = pipeline
            .handle(&ResizeRequest::new("not a valid uri", 10, 20))
            .await;

        assert_eq!(outcome.message(), "Failed to read Original Image");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn end_to_end_with_local_file_and_local_storage() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("portrait.png");
        image::RgbImage::from_pixel(30, 60, image::Rgb([1, 2, 3]))
            .save(&source)
            .unwrap();
        let location = url::Url::from_file_path(&source).unwrap().to_string();

        let objects = dir.path().join("objects");
        let storage = Arc::new(LocalStorage::new(&objects).await.unwrap());
        let pipeline = PipelineOrchestrator::with_fetcher(
            KeyDeriver::new("https://out.example.com/", FingerprintScheme::Sha256),
            storage,
            HttpImageFetcher::new().unwrap().with_local_files(),
        );
        let request = ResizeRequest::new(location, 40, 40);

        let first = pipeline.handle(&request).await;
        let object_key = pipeline
            .key_deriver()
            .derive(&request.url, 40, 40)
            .object_key;
        assert!(matches!(first, ResizeOutcome::Stored { .. }));
        assert!(object_key.starts_with("portrait.png-"));

        let stored =
            image::load_from_memory(&std::fs::read(objects.join(&object_key)).unwrap()).unwrap();
        assert_eq!((stored.width(), stored.height()), (20, 40));

        let second = pipeline.handle(&request).await;
        assert!(matches!(second, ResizeOutcome::Cached { .. }));
        assert_eq!(first.location(), second.location());
    }
}
