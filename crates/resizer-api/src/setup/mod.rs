//! Application setup and initialization

pub mod routes;
pub mod server;

use crate::state::AppState;
use anyhow::{Context, Result};
use resizer_core::Config;
use resizer_processing::{HttpImageFetcher, PipelineOrchestrator};
use std::sync::Arc;

/// Build storage, the pipeline and the router from configuration
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    let storage = resizer_storage::create_storage(&config)
        .await
        .context("Failed to initialize storage")?;

    tracing::info!(
        backend = %storage.backend_type(),
        bucket = %storage.bucket(),
        public_url = %config.public_url,
        fingerprint_scheme = %config.fingerprint_scheme,
        "Storage initialized"
    );

    // Remote sources only: a public caller must not be able to publish server files.
    let fetcher = HttpImageFetcher::new()
        .context("Failed to initialize pipeline")?
        .with_max_bytes(config.max_source_bytes);
    let pipeline = PipelineOrchestrator::with_fetcher(config.key_deriver(), storage.clone(), fetcher);

    let state = Arc::new(AppState::new(storage, pipeline));
    let router = routes::setup_routes(state.clone());

    Ok((state, router))
}
