//! Resize-to-box and GIF encoding.
//!
//! Scaling keeps the source aspect ratio. Landscape and square sources are fitted to the
//! target width, portrait sources to the target height, so one side of the output always
//! matches the request exactly and the other follows the source proportions.

use crate::error::TransformError;
use async_trait::async_trait;
use resizer_core::constants::{MAX_OUTPUT_DIMENSION, MAX_OUTPUT_PIXELS};
use bytes::Bytes;
use image::codecs::gif::GifEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ExtendedColorType, GenericImageView};

/// 3x3 smoothing kernel applied after scaling to soften aliasing
const ANTIALIAS_KERNEL: [f32; 9] = [0.0, 0.08, 0.0, 0.08, 0.68, 0.08, 0.0, 0.08, 0.0];

/// Scales a decoded image and encodes the result
#[async_trait]
pub trait ImageTransformer: Send + Sync {
    async fn resize(
        &self,
        image: DynamicImage,
        width: u32,
        height: u32,
    ) -> Result<Bytes, TransformError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GifTransformer;

impl GifTransformer {
    /// Output dimensions for a `source` image fitted into `target`.
    pub fn fit_dimensions(source: (u32, u32), target: (u32, u32)) -> (u32, u32) {
        let (src_width, src_height) = source;
        let (target_width, target_height) = target;
        let ratio = src_height as f64 / src_width as f64;

        if ratio <= 1.0 {
            let height = (target_width as f64 * ratio).round() as u32;
            (target_width, height.max(1))
        } else {
            let width = (target_height as f64 / ratio).round() as u32;
            (width.max(1), target_height)
        }
    }

    /// Synchronous resize + encode. Call from a blocking context.
    pub fn resize_blocking(
        image: &DynamicImage,
        width: u32,
        height: u32,
    ) -> Result<Bytes, TransformError> {
        if width == 0 || height == 0 {
            return Err(TransformError::InvalidDimensions { width, height });
        }

        let (src_width, src_height) = image.dimensions();
        if src_width == 0 || src_height == 0 {
            return Err(TransformError::EmptySource);
        }

        let (out_width, out_height) =
            Self::fit_dimensions((src_width, src_height), (width, height));
        if out_width > MAX_OUTPUT_DIMENSION
            || out_height > MAX_OUTPUT_DIMENSION
            || u64::from(out_width) * u64::from(out_height) > MAX_OUTPUT_PIXELS
        {
            return Err(TransformError::OutputTooLarge {
                width: out_width,
                height: out_height,
            });
        }

        let resized = image
            .resize_exact(out_width, out_height, FilterType::Triangle)
            .filter3x3(&ANTIALIAS_KERNEL);
        let rgba = resized.to_rgba8();

        let mut buffer = Vec::with_capacity(out_width as usize * out_height as usize);
        {
            let mut encoder = GifEncoder::new(&mut buffer);
            encoder.encode(
                rgba.as_raw(),
                out_width,
                out_height,
                ExtendedColorType::Rgba8,
            )?;
        }

        tracing::debug!(
            source_width = src_width,
            source_height = src_height,
            width = out_width,
            height = out_height,
            size_bytes = buffer.len(),
            "Image resized"
        );

        Ok(Bytes::from(buffer))
    }
}

#[async_trait]
impl ImageTransformer for GifTransformer {
    async fn resize(
        &self,
        image: DynamicImage,
        width: u32,
        height: u32,
    ) -> Result<Bytes, TransformError> {
        tokio::task::spawn_blocking(move || Self::resize_blocking(&image, width, height))
            .await
            .map_err(|e| TransformError::Task(e.to_string()))?
    }
}
