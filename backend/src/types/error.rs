//! Universal error handling for the API

use aide::OperationOutput;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use schemars::JsonSchema;
use serde::Serialize;

use crate::upload_issuance::IssuanceError;

/// Message returned for any failure while issuing an upload URL
pub const UPLOAD_URL_FAILED: &str = "Failed to generate upload URL";

/// API error body, `{"error": "..."}`
#[derive(Debug, Serialize, JsonSchema)]
pub struct ApiErrorResponse {
    /// Human-readable error message
    pub error: &'static str,
}

/// Application error type that wraps the API error response
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    inner: ApiErrorResponse,
}

impl AppError {
    /// Create a new application error
    #[must_use]
    pub const fn new(status: StatusCode, msg: &'static str) -> Self {
        Self {
            status,
            inner: ApiErrorResponse { error: msg },
        }
    }

    /// 400 with `msg`
    #[must_use]
    pub const fn bad_request(msg: &'static str) -> Self {
        Self::new(StatusCode::BAD_REQUEST, msg)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self.status.as_u16() {
            400..=499 => tracing::warn!("Client error: {}", self.inner.error),
            500..=599 => tracing::error!("Server error: {}", self.inner.error),
            _ => {}
        }

        (self.status, Json(self.inner)).into_response()
    }
}

/// Convert issuance errors to application errors
///
/// Only client errors carry their message to the response; every other cause
/// is logged here and replaced by a generic message.
impl From<IssuanceError> for AppError {
    fn from(err: IssuanceError) -> Self {
        match err {
            IssuanceError::InvalidRequest(msg) => Self::bad_request(msg),
            IssuanceError::Key(e) => {
                tracing::error!("Object key derivation failed: {e}");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, UPLOAD_URL_FAILED)
            }
            IssuanceError::Descriptor(e) => {
                tracing::error!("Invalid storage operation: {e}");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, UPLOAD_URL_FAILED)
            }
            IssuanceError::Signing(e) => {
                tracing::error!("Signing failed: {e}");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, UPLOAD_URL_FAILED)
            }
        }
    }
}

impl OperationOutput for AppError {
    type Inner = ApiErrorResponse;

    fn operation_response(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) -> Option<aide::openapi::Response> {
        Json::<ApiErrorResponse>::operation_response(ctx, operation)
    }
}
