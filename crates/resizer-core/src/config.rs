//! Configuration module
//!
//! Loaded once per process from the environment (and an optional `.env` file).
//! Variable names are matched case-insensitively, so the deployment's lowercase
//! `publicurl` / `bucketname` and conventional `AWS_REGION` style names both work.

use crate::constants::{DEFAULT_MAX_SOURCE_SIZE_MB, DEFAULT_REGION, DEFAULT_SERVER_PORT};
use crate::error::ConfigError;
use crate::keys::{FingerprintScheme, KeyDeriver};
use crate::storage_types::StorageBackend;
use serde::Deserialize;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Raw environment as seen by `envy` (keys are lowercased).
#[derive(Debug, Deserialize)]
struct RawEnv {
    publicurl: Option<String>,
    bucketname: Option<String>,
    storage_backend: Option<String>,
    s3_region: Option<String>,
    aws_region: Option<String>,
    s3_endpoint: Option<String>,
    local_storage_path: Option<String>,
    fingerprint_scheme: Option<String>,
    server_port: Option<u16>,
    log_format: Option<String>,
    max_source_size_mb: Option<u64>,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" | "pretty" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => Err(anyhow::anyhow!("Invalid log format: {}", s)),
        }
    }
}

impl Display for LogFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            LogFormat::Text => write!(f, "text"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    /// Prefix prepended to object keys to form public locations.
    pub public_url: String,
    pub bucket_name: Option<String>,
    pub storage_backend: StorageBackend,
    pub region: String,
    /// Custom endpoint for S3-compatible providers (MinIO, DigitalOcean Spaces, etc.)
    pub s3_endpoint: Option<String>,
    pub local_storage_path: Option<String>,
    pub fingerprint_scheme: FingerprintScheme,
    pub server_port: u16,
    pub log_format: LogFormat,
    /// Largest source image the fetcher will download
    pub max_source_bytes: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let raw: RawEnv = envy::from_env()?;
        Self::from_raw(raw)
    }

    /// Build from explicit key/value pairs instead of the process environment.
    pub fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let raw: RawEnv = envy::from_iter(
            vars.into_iter()
                .map(|(key, value)| (key.to_lowercase(), value)),
        )?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawEnv) -> Result<Self, ConfigError> {
        let storage_backend = match raw.storage_backend.as_deref() {
            Some(value) => value.parse().map_err(|e: anyhow::Error| ConfigError::Invalid {
                key: "STORAGE_BACKEND",
                reason: e.to_string(),
            })?,
            None => StorageBackend::default(),
        };

        let fingerprint_scheme = match raw.fingerprint_scheme.as_deref() {
            Some(value) => value.parse().map_err(|e: anyhow::Error| ConfigError::Invalid {
                key: "FINGERPRINT_SCHEME",
                reason: e.to_string(),
            })?,
            None => FingerprintScheme::default(),
        };

        let log_format = match raw.log_format.as_deref() {
            Some(value) => value.parse().map_err(|e: anyhow::Error| ConfigError::Invalid {
                key: "LOG_FORMAT",
                reason: e.to_string(),
            })?,
            None => LogFormat::default(),
        };

        let config = Config {
            public_url: raw.publicurl.ok_or(ConfigError::Missing("publicurl"))?,
            bucket_name: non_empty(raw.bucketname),
            storage_backend,
            region: non_empty(raw.s3_region)
                .or_else(|| non_empty(raw.aws_region))
                .unwrap_or_else(|| DEFAULT_REGION.to_string()),
            s3_endpoint: non_empty(raw.s3_endpoint),
            local_storage_path: non_empty(raw.local_storage_path),
            fingerprint_scheme,
            server_port: raw.server_port.unwrap_or(DEFAULT_SERVER_PORT),
            log_format,
            max_source_bytes: raw
                .max_source_size_mb
                .unwrap_or(DEFAULT_MAX_SOURCE_SIZE_MB)
                * 1024
                * 1024,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.public_url.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "publicurl",
                reason: "must not be empty".to_string(),
            });
        }

        match self.storage_backend {
            StorageBackend::S3 if self.bucket_name.is_none() => {
                Err(ConfigError::Missing("bucketname"))
            }
            StorageBackend::Local if self.local_storage_path.is_none() => {
                Err(ConfigError::Missing("LOCAL_STORAGE_PATH"))
            }
            _ => Ok(()),
        }?;

        if self.max_source_bytes == 0 {
            return Err(ConfigError::Invalid {
                key: "MAX_SOURCE_SIZE_MB",
                reason: "must be positive".to_string(),
            });
        }
        Ok(())
    }

    /// Key deriver bound to this deployment's prefix and fingerprint scheme.
    pub fn key_deriver(&self) -> KeyDeriver {
        KeyDeriver::new(self.public_url.clone(), self.fingerprint_scheme)
    }

    pub fn bucket_name(&self) -> Option<&str> {
        self.bucket_name.as_deref()
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.s3_endpoint.as_deref()
    }

    pub fn local_storage_path(&self) -> Option<&str> {
        self.local_storage_path.as_deref()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
