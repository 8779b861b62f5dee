//! Resizer Core Library
//!
//! Domain types shared by every resizer component: the resize request and outcome,
//! deterministic key derivation, configuration and storage backend selection.

pub mod config;
pub mod constants;
pub mod error;
pub mod keys;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::{Config, LogFormat};
pub use error::{ConfigError, KeyError};
pub use keys::{file_name_of, FingerprintScheme, KeyDeriver};
pub use models::{DerivedKey, FailureKind, ResizeOutcome, ResizeRequest};
pub use storage_types::StorageBackend;
