//! Error types module
//!
//! Errors raised while loading configuration or deriving keys. Pipeline stage failures
//! live next to the stage that raises them; the orchestrator folds all of them into a
//! [`crate::FailureKind`].

use thiserror::Error;

/// Configuration loading and validation errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read environment: {0}")]
    Env(#[from] envy::Error),

    #[error("Missing configuration: {0}")]
    Missing(&'static str),

    #[error("Invalid configuration value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Key derivation errors
///
/// Never aborts a pipeline run: the deriver logs it and falls back to an empty
/// file-name component.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("Invalid source location {location}: {reason}")]
    InvalidSourceLocation { location: String, reason: String },
}
