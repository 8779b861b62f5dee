use crate::staging::StagedUpload;
use crate::traits::{ObjectMetadata, Storage, StorageError, StorageResult, Visibility};
use crate::StorageBackend;
use async_trait::async_trait;
use aws_config::meta::region::RegionProviderChain;
use aws_config::BehaviorVersion;
use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
use aws_sdk_s3::operation::head_object::HeadObjectError;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use aws_sdk_s3::Client;
use bytes::Bytes;
use resizer_core::constants::OUTPUT_EXTENSION;

/// S3 storage implementation
///
/// Retries are left to the SDK's standard retry policy; this type adds none of its own.
#[derive(Clone)]
pub struct S3Storage {
    client: Client,
    bucket: String,
}

impl S3Storage {
    /// Create a new S3Storage instance
    ///
    /// # Arguments
    /// * `bucket` - S3 bucket name
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    pub async fn new(
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
    ) -> StorageResult<Self> {
        let region_provider = RegionProviderChain::first_try(aws_config::Region::new(region));

        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(region_provider)
            .load()
            .await;

        let client = if let Some(ref endpoint) = endpoint_url {
            // Path-style addressing is required by MinIO and most S3-compatible providers
            let s3_config = aws_sdk_s3::config::Builder::from(&config)
                .endpoint_url(endpoint)
                .force_path_style(true)
                .build();
            Client::from_conf(s3_config)
        } else {
            Client::new(&config)
        };

        Ok(Self::from_client(client, bucket))
    }

    /// Wrap an already configured client.
    pub fn from_client(client: Client, bucket: String) -> Self {
        S3Storage { client, bucket }
    }

    fn canned_acl(visibility: Visibility) -> ObjectCannedAcl {
        match visibility {
            Visibility::Private => ObjectCannedAcl::Private,
            Visibility::PublicRead => ObjectCannedAcl::PublicRead,
        }
    }
}

#[async_trait]
impl Storage for S3Storage {
    async fn head(&self, object_key: &str) -> StorageResult<ObjectMetadata> {
        let result = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(object_key)
            .send()
            .await;

        match result {
            Ok(output) => Ok(ObjectMetadata {
                size_bytes: output
                    .content_length()
                    .and_then(|len| u64::try_from(len).ok()),
                content_type: output.content_type().map(String::from),
            }),
            Err(SdkError::ServiceError(service_err))
                if matches!(service_err.err(), HeadObjectError::NotFound(_)) =>
            {
                Err(StorageError::NotFound(object_key.to_string()))
            }
            Err(e) => Err(StorageError::BackendError(
                DisplayErrorContext(&e).to_string(),
            )),
        }
    }

    async fn put(
        &self,
        object_key: &str,
        data: Bytes,
        content_type: &str,
        visibility: Visibility,
    ) -> StorageResult<()> {
        let start = std::time::Instant::now();

        // Dropped (and deleted) on every return path below
        let staged = StagedUpload::stage(&data, OUTPUT_EXTENSION).await?;
        drop(data);

        let body = ByteStream::from_path(staged.path()).await.map_err(|e| {
            StorageError::Staging(format!(
                "Failed to read staged file {}: {}",
                staged.path().display(),
                e
            ))
        })?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(object_key)
            .body(body)
            .content_type(content_type)
            .acl(Self::canned_acl(visibility))
            .send()
            .await
            .map_err(|e| {
                let detail = DisplayErrorContext(&e).to_string();
                tracing::error!(
                    error = %detail,
                    bucket = %self.bucket,
                    key = %object_key,
                    size_bytes = staged.size_bytes(),
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 upload failed"
                );
                StorageError::UploadFailed(detail)
            })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %object_key,
            size_bytes = staged.size_bytes(),
            visibility = ?visibility,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Stored in s3"
        );

        Ok(())
    }

    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}
