//! Image scaling and encoding

pub mod transformer;

pub use transformer::{GifTransformer, ImageTransformer};
