//! Resizer Storage Library
//!
//! Object store abstraction used by the resize pipeline, with S3 and local filesystem
//! implementations.
//!
//! # Object keys
//!
//! Keys are flat, file-name-like identifiers (`cat.jpg-114832261-100-50`). The public
//! prefix a caller sees is never part of the key. Keys must not contain `..` components
//! or a leading `/`.

pub mod factory;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod staging;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use resizer_core::StorageBackend;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use staging::StagedUpload;
pub use traits::{ObjectMetadata, Storage, StorageError, StorageResult, Visibility};
