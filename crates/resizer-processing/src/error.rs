use thiserror::Error;

/// The source image could not be retrieved or decoded
#[derive(Debug, Error)]
#[error("Failed to fetch {location}: {message}")]
pub struct FetchError {
    pub location: String,
    pub message: String,
}

impl FetchError {
    pub fn new(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            message: message.into(),
        }
    }
}

/// Scaling or encoding errors
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("Invalid target dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Output {width}x{height} exceeds the supported size")]
    OutputTooLarge { width: u32, height: u32 },

    #[error("Source image has no pixels")]
    EmptySource,

    #[error("Failed to encode image: {0}")]
    Encode(#[from] image::ImageError),

    #[error("Transform task failed: {0}")]
    Task(String),
}
