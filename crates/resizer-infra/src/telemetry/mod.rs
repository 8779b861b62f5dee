//! Telemetry initialization
//!
//! Installs the global `tracing` subscriber: an `EnvFilter` (from `RUST_LOG`, falling back
//! to [`default_filter`]) and a fmt layer in text or JSON form.

mod init_basic;

pub use init_basic::{default_filter, init_telemetry, shutdown_telemetry};
