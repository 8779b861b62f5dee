//! Request, key and outcome types for a single resize invocation.

use crate::constants::{
    MAX_OUTPUT_DIMENSION, MSG_FETCH_FAILED, MSG_RESIZE_FAILED, MSG_STORE_FAILED,
};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Invocation input: `{ "url": ..., "width": ..., "height": ... }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResizeRequest {
    pub url: String,
    pub width: u32,
    pub height: u32,
}

impl ResizeRequest {
    pub fn new(url: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            url: url.into(),
            width,
            height,
        }
    }

    /// Target dimensions must both be positive and fit in a GIF frame.
    pub fn has_valid_dimensions(&self) -> bool {
        (1..=MAX_OUTPUT_DIMENSION).contains(&self.width)
            && (1..=MAX_OUTPUT_DIMENSION).contains(&self.height)
    }
}

/// Storage address derived from a request.
///
/// `object_key` identifies the object inside the bucket; `location` is the same key
/// behind the configured public prefix and is what callers receive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DerivedKey {
    pub object_key: String,
    pub location: String,
}

/// Failure classes reported to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Fetch,
    Resize,
    Store,
}

impl FailureKind {
    /// The fixed, externally visible message for this failure.
    pub fn message(self) -> &'static str {
        match self {
            FailureKind::Fetch => MSG_FETCH_FAILED,
            FailureKind::Resize => MSG_RESIZE_FAILED,
            FailureKind::Store => MSG_STORE_FAILED,
        }
    }

    /// HTTP status code used by the HTTP surface
    pub fn http_status_code(self) -> u16 {
        match self {
            FailureKind::Fetch | FailureKind::Store => 502,
            FailureKind::Resize => 422,
        }
    }
}

/// Terminal result of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ResizeOutcome {
    /// The object already existed; nothing was fetched, resized or stored.
    Cached { location: String },
    /// The object was computed and stored during this run.
    Stored { location: String },
    Failed { kind: FailureKind },
}

impl ResizeOutcome {
    pub fn location(&self) -> Option<&str> {
        match self {
            ResizeOutcome::Cached { location } | ResizeOutcome::Stored { location } => {
                Some(location)
            }
            ResizeOutcome::Failed { .. } => None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.location().is_some()
    }

    pub fn failure(&self) -> Option<FailureKind> {
        match self {
            ResizeOutcome::Failed { kind } => Some(*kind),
            _ => None,
        }
    }

    /// Single-string form: the public location, or the fixed failure message.
    pub fn message(&self) -> &str {
        match self {
            ResizeOutcome::Cached { location } | ResizeOutcome::Stored { location } => location,
            ResizeOutcome::Failed { kind } => kind.message(),
        }
    }
}

impl Display for ResizeOutcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.message())
    }
}
