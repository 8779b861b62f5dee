//! Resizer Infrastructure Library
//!
//! Process-wide concerns shared by the resizer binaries: tracing setup and teardown.

#[cfg(feature = "observability-basic")]
pub mod telemetry;

#[cfg(feature = "observability-basic")]
pub use telemetry::{default_filter, init_telemetry, shutdown_telemetry};
