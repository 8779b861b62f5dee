use crate::error::{ApiError, ValidatedJson};
use crate::state::AppState;
use axum::{
    extract::State,
    http::{header::HeaderName, HeaderValue},
    response::{IntoResponse, Response},
};
use resizer_core::constants::MAX_OUTPUT_DIMENSION;
use resizer_core::{ResizeOutcome, ResizeRequest};
use std::sync::Arc;

/// Reports whether the location was served from an existing object or computed now.
pub const RESIZE_STATUS_HEADER: HeaderName = HeaderName::from_static("x-resize-status");

/// Run one resize invocation
///
/// Responds `200 text/plain` with the public location of the resized object, or with the
/// fixed failure message and a 502/422 status.
#[tracing::instrument(
    skip(state, request),
    fields(url = %request.url, width = request.width, height = request.height)
)]
pub async fn resize_image(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<ResizeRequest>,
) -> Result<Response, ApiError> {
    if request.url.trim().is_empty() {
        return Err(ApiError::InvalidInput("url is required".to_string()));
    }
    if !request.has_valid_dimensions() {
        return Err(ApiError::InvalidInput(format!(
            "width and height must be between 1 and {}",
            MAX_OUTPUT_DIMENSION
        )));
    }

    let outcome = state.pipeline.handle(&request).await;

    let status = match &outcome {
        ResizeOutcome::Cached { .. } => "cached",
        ResizeOutcome::Stored { .. } => "stored",
        ResizeOutcome::Failed { kind } => return Err(ApiError::Pipeline(*kind)),
    };

    Ok((
        [(RESIZE_STATUS_HEADER, HeaderValue::from_static(status))],
        outcome.message().to_string(),
    )
        .into_response())
}
