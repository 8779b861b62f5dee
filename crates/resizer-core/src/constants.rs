/// Returned when the encoded image could not be staged or uploaded.
pub const MSG_STORE_FAILED: &str = "Failed to store image in S3";

/// Returned when the decoded image could not be resized or encoded.
pub const MSG_RESIZE_FAILED: &str = "Failed to resize Image";

/// Returned when the source image could not be fetched or decoded.
pub const MSG_FETCH_FAILED: &str = "Failed to read Original Image";

/// Content type of every stored object (fixed GIF output).
pub const OUTPUT_CONTENT_TYPE: &str = "image/gif";

/// File extension used for locally staged uploads.
pub const OUTPUT_EXTENSION: &str = "gif";

pub const DEFAULT_SERVER_PORT: u16 = 3000;
pub const DEFAULT_REGION: &str = "us-east-1";

/// Largest output side a GIF frame can describe.
pub const MAX_OUTPUT_DIMENSION: u32 = u16::MAX as u32;

/// Upper bound on output pixels, keeping the raster allocation bounded.
pub const MAX_OUTPUT_PIXELS: u64 = 40_000_000;

pub const DEFAULT_MAX_SOURCE_SIZE_MB: u64 = 25;
