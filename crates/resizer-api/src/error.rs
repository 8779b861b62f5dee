//! HTTP error response conversion
//!
//! Request validation errors render as a JSON [`ErrorResponse`]. Pipeline failures render
//! as the bare failure message in `text/plain`, the same string a direct invocation
//! returns.

use axum::{
    extract::rejection::JsonRejection,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use resizer_core::FailureKind;
use serde::{de::DeserializeOwned, Serialize};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    /// Machine-readable error code for programmatic handling
    pub code: String,
}

#[derive(Debug)]
pub enum ApiError {
    /// Malformed body or invalid parameters, rejected before the pipeline runs
    InvalidInput(String),
    /// The pipeline ran and reported a failure
    Pipeline(FailureKind),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidInput(format!("Invalid request body: {}", rejection.body_text()))
    }
}

/// JSON body extractor that rejects with our [`ErrorResponse`] format instead of axum's
/// plain-text rejection.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(inner) = Json::<T>::from_request(req, state)
            .await
            .map_err(ApiError::from)?;
        Ok(ValidatedJson(inner))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::InvalidInput(message) => {
                tracing::debug!(error = %message, "Rejected request");
                (
                    StatusCode::BAD_REQUEST,
                    Json(ErrorResponse {
                        error: message,
                        code: "INVALID_INPUT".to_string(),
                    }),
                )
                    .into_response()
            }
            ApiError::Pipeline(kind) => {
                let status = StatusCode::from_u16(kind.http_status_code())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                (status, kind.message()).into_response()
            }
        }
    }
}
