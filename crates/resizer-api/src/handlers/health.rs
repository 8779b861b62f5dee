use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use resizer_storage::StorageError;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

const STORAGE_CHECK_TIMEOUT: Duration = Duration::from_secs(5);
const PROBE_KEY: &str = "health-check-non-existent-key";

#[derive(Debug, Serialize)]
pub struct HealthCheckResponse {
    pub status: String,
    pub storage_backend: String,
    pub storage: String,
}

/// Liveness plus a lightweight store connectivity probe
///
/// Storage problems degrade the report but never fail it: the pipeline itself treats an
/// unreachable store as a cache miss.
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let storage = match tokio::time::timeout(STORAGE_CHECK_TIMEOUT, state.storage.head(PROBE_KEY))
        .await
    {
        Ok(Ok(_)) | Ok(Err(StorageError::NotFound(_))) => "healthy".to_string(),
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "Storage health check warning");
            format!("degraded: {}", e)
        }
        Err(_) => {
            tracing::warn!("Storage health check timed out");
            "timeout".to_string()
        }
    };

    (
        StatusCode::OK,
        Json(HealthCheckResponse {
            status: "healthy".to_string(),
            storage_backend: state.storage.backend_type().to_string(),
            storage,
        }),
    )
}
