use resizer_core::LogFormat;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset or invalid
pub fn default_filter() -> &'static str {
    "resizer=debug,resizer_core=debug,resizer_storage=debug,resizer_processing=debug,resizer_api=debug,tower_http=debug"
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter().into())
}

/// Initialize tracing for the process
///
/// Fails if a global subscriber is already installed.
pub fn init_telemetry(
    service_name: &str,
    service_version: &str,
    log_format: LogFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let registry = tracing_subscriber::registry().with(env_filter());

    match log_format {
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).try_init()?,
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(false),
            )
            .try_init()?,
    }

    tracing::info!(
        service_name = %service_name,
        service_version = %service_version,
        log_format = %log_format,
        "Telemetry initialized"
    );
    Ok(())
}

pub async fn shutdown_telemetry() {
    tracing::debug!("Telemetry shutdown");
}
