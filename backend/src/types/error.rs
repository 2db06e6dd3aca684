//! Universal error handling for the API

use aide::OperationOutput;
use axum::{
    extract::multipart::{MultipartError, MultipartRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use schemars::JsonSchema;
use serde::Serialize;

use crate::{gallery::GalleryError, session::SessionError};

/// API error response envelope
///
/// Carries `success: false` and `message` so clients can treat it like any other
/// response of the gateway.
#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorResponse {
    /// Always `false`
    pub success: bool,
    /// Machine-readable error code
    pub code: &'static str,
    /// Human-readable error message
    pub message: &'static str,
    /// Whether the client should retry the request
    pub allow_retry: bool,
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
    pub const fn new(
        status: StatusCode,
        code: &'static str,
        msg: &'static str,
        retry: bool,
    ) -> Self {
        Self {
            status,
            inner: ApiErrorResponse {
                success: false,
                code,
                message: msg,
                allow_retry: retry,
            },
        }
    }

}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the error based on status code
        match self.status.as_u16() {
            400..=499 => tracing::warn!(
                "Client error: {} - {}",
                self.inner.code,
                self.inner.message
            ),
            500..=599 => tracing::error!(
                "Server error: {} - {}",
                self.inner.code,
                self.inner.message
            ),
            _ => {}
        }

        (self.status, Json(self.inner)).into_response()
    }
}

/// Convert gallery errors to application errors
impl From<GalleryError> for AppError {
    fn from(err: GalleryError) -> Self {
        match &err {
            GalleryError::Unauthorized => Self::new(
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "Not logged in",
                false,
            ),
            GalleryError::NoFiles => Self::new(
                StatusCode::BAD_REQUEST,
                "no_files",
                "No files were uploaded",
                false,
            ),
            GalleryError::InvalidStorageKey(key) => {
                tracing::debug!("Rejected storage key: {key:?}");
                Self::new(
                    StatusCode::BAD_REQUEST,
                    "invalid_file_name",
                    "Invalid file name",
                    false,
                )
            }
            GalleryError::AllUploadsFailed { .. } => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "all_uploads_failed",
                "All file uploads failed",
                true,
            ),
            GalleryError::CatalogUnavailable(source) => {
                tracing::error!("Listing objects failed: {source}");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "catalog_unavailable",
                    "Failed to list images",
                    true,
                )
            }
            GalleryError::DeletionFailed(source) => {
                tracing::error!("Deleting object failed: {source}");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "deletion_failed",
                    "Failed to delete image",
                    true,
                )
            }
        }
    }
}

/// Convert session errors to application errors
impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::InvalidPassword => Self::new(
                StatusCode::UNAUTHORIZED,
                "invalid_password",
                "Wrong password",
                false,
            ),
            SessionError::LoginDisabled => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "login_disabled",
                "Server configuration error",
                false,
            ),
            SessionError::InvalidSecret | SessionError::Signing(_) => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "Internal server error",
                false,
            ),
        }
    }
}

/// Malformed multipart bodies are client errors
impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        tracing::warn!("Multipart parsing error: {err}");
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return Self::new(
                StatusCode::PAYLOAD_TOO_LARGE,
                "payload_too_large",
                "Upload exceeds the request size limit",
                false,
            );
        }
        Self::new(
            StatusCode::BAD_REQUEST,
            "invalid_multipart",
            "Malformed multipart body",
            false,
        )
    }
}

/// Requests that are not multipart at all
impl From<MultipartRejection> for AppError {
    fn from(err: MultipartRejection) -> Self {
        tracing::warn!("Multipart rejection: {err}");
        Self::new(
            StatusCode::BAD_REQUEST,
            "invalid_multipart",
            "Expected a multipart/form-data body",
            false,
        )
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
