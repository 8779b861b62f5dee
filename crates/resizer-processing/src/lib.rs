//! Resizer Processing Library
//!
//! The resize pipeline and its stages: source fetching, existence checks against the
//! object store, scaling and GIF encoding.

pub mod error;
pub mod existence;
pub mod fetcher;
pub mod image;
pub mod pipeline;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

pub use error::{FetchError, TransformError};
pub use existence::ExistenceChecker;
pub use fetcher::{HttpImageFetcher, ImageFetcher};
pub use crate::image::{GifTransformer, ImageTransformer};
pub use pipeline::PipelineOrchestrator;
