//! Source image retrieval.

use crate::error::FetchError;
use async_trait::async_trait;
use bytes::Bytes;
use image::DynamicImage;
use resizer_core::constants::DEFAULT_MAX_SOURCE_SIZE_MB;
use std::io::Cursor;
use url::Url;

/// Retrieves and decodes the image at a source location
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, location: &str) -> Result<DynamicImage, FetchError>;
}

/// Fetcher for `http` and `https` locations, and `file` locations when enabled.
///
/// One GET per call, no retries, no timeout of its own. The client is shared so
/// connections are pooled across invocations. Bodies larger than `max_bytes` are
/// rejected before decoding.
#[derive(Clone)]
pub struct HttpImageFetcher {
    client: reqwest::Client,
    allow_local_files: bool,
    max_bytes: u64,
}

impl HttpImageFetcher {
    pub fn new() -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("resizer/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::new("", format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self::with_client(client))
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            allow_local_files: false,
            max_bytes: DEFAULT_MAX_SOURCE_SIZE_MB * 1024 * 1024,
        }
    }

    /// Also accept `file://` locations. Only for trusted callers such as the CLI.
    pub fn with_local_files(mut self) -> Self {
        self.allow_local_files = true;
        self
    }

    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    fn check_size(&self, location: &str, size: u64) -> Result<(), FetchError> {
        if size > self.max_bytes {
            return Err(FetchError::new(
                location,
                format!(
                    "File size {} exceeds maximum allowed size of {} bytes",
                    size, self.max_bytes
                ),
            ));
        }
        Ok(())
    }

    async fn download(&self, location: &str, url: Url) -> Result<Bytes, FetchError> {
        let mut response = self.client.get(url).send().await.map_err(|e| {
            FetchError::new(location, format!("Failed to download from URL: {}", e))
        })?;

        if !response.status().is_success() {
            return Err(FetchError::new(
                location,
                format!("URL returned status code: {}", response.status()),
            ));
        }

        if let Some(length) = response.content_length() {
            self.check_size(location, length)?;
        }

        let mut body = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| FetchError::new(location, format!("Failed to read response body: {}", e)))?
        {
            self.check_size(location, (body.len() + chunk.len()) as u64)?;
            body.extend_from_slice(&chunk);
        }

        Ok(Bytes::from(body))
    }

    async fn read_file(&self, location: &str, url: &Url) -> Result<Bytes, FetchError> {
        let path = url
            .to_file_path()
            .map_err(|_| FetchError::new(location, "Not a local file path"))?;

        let metadata = tokio::fs::metadata(&path)
            .await
            .map_err(|e| FetchError::new(location, format!("Failed to read {}: {}", path.display(), e)))?;
        self.check_size(location, metadata.len())?;

        tokio::fs::read(&path)
            .await
            .map(Bytes::from)
            .map_err(|e| FetchError::new(location, format!("Failed to read {}: {}", path.display(), e)))
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, location: &str) -> Result<DynamicImage, FetchError> {
        let url = Url::parse(location)
            .map_err(|e| FetchError::new(location, format!("Invalid URL format: {}", e)))?;

        let data = match url.scheme() {
            "http" | "https" => self.download(location, url).await?,
            "file" if self.allow_local_files => self.read_file(location, &url).await?,
            other => {
                return Err(FetchError::new(
                    location,
                    format!("Unsupported URL scheme: {}", other),
                ))
            }
        };

        let size_bytes = data.len();
        let image = tokio::task::spawn_blocking(move || decode(&data))
            .await
            .map_err(|e| FetchError::new(location, format!("Decode task failed: {}", e)))?
            .map_err(|e| FetchError::new(location, format!("Invalid image file: {}", e)))?;

        tracing::debug!(
            location = %location,
            size_bytes = size_bytes,
            width = image.width(),
            height = image.height(),
            "Source image decoded"
        );

        Ok(image)
    }
}

fn decode(data: &[u8]) -> Result<DynamicImage, image::ImageError> {
    let image = image::ImageReader::new(Cursor::new(data))
        .with_guessed_format()?
        .decode()?;
    Ok(image)
}
