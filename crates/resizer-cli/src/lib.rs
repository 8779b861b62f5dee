use anyhow::Context;
use resizer_core::{Config, FingerprintScheme, KeyDeriver, ResizeOutcome, ResizeRequest};
use resizer_processing::{HttpImageFetcher, PipelineOrchestrator};
use std::io::Read;

/// Parse an invocation record (`{"url": ..., "width": ..., "height": ...}`).
pub fn read_event(mut reader: impl Read) -> anyhow::Result<ResizeRequest> {
    let mut raw = String::new();
    reader
        .read_to_string(&mut raw)
        .context("Read invocation record")?;
    serde_json::from_str(&raw).context("Parse invocation record")
}

/// Run one pipeline invocation against the configured store.
///
/// Unlike the HTTP service, the CLI also reads `file://` sources.
pub async fn run_invocation(
    config: &Config,
    request: &ResizeRequest,
) -> anyhow::Result<ResizeOutcome> {
    let storage = resizer_storage::create_storage(config)
        .await
        .context("Initialize storage")?;
    let fetcher = HttpImageFetcher::new()
        .context("Initialize pipeline")?
        .with_local_files()
        .with_max_bytes(config.max_source_bytes);
    let pipeline = PipelineOrchestrator::with_fetcher(config.key_deriver(), storage, fetcher);

    Ok(pipeline.handle(request).await)
}

/// Key deriver for `resizer key`: explicit flags win, otherwise the same `publicurl` and
/// `FINGERPRINT_SCHEME` variables the service reads.
pub fn key_deriver_from(
    public_url: Option<String>,
    scheme: Option<FingerprintScheme>,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<KeyDeriver> {
    let lookup = |name: &str| env(name).or_else(|| env(&name.to_uppercase()));

    let public_url = match public_url {
        Some(prefix) => prefix,
        None => lookup("publicurl").context("Pass --public-url or set publicurl")?,
    };
    let scheme = match scheme {
        Some(scheme) => scheme,
        None => match lookup("fingerprint_scheme") {
            Some(value) => value.parse().context("Invalid FINGERPRINT_SCHEME")?,
            None => FingerprintScheme::default(),
        },
    };

    Ok(KeyDeriver::new(public_url, scheme))
}

/// Initialize tracing for CLI binaries. Logs go to stderr so stdout carries only the result.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}
