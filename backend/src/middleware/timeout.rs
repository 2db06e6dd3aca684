use std::time::Duration;

use axum::{extract::Request, http::StatusCode, middleware::Next, response::Response, Extension};

use crate::types::AppError;

/// Time a bounded route has to produce its response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTimeout(pub Duration);

/// Answers 408 with the error envelope when the inner handler runs past the limit
///
/// The handler future is dropped on expiry, so routes whose backend calls must run
/// to completion are not wrapped in this middleware.
pub async fn request_timeout(
    Extension(RequestTimeout(limit)): Extension<RequestTimeout>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    tokio::time::timeout(limit, next.run(request))
        .await
        .map_err(|_| {
            AppError::new(
                StatusCode::REQUEST_TIMEOUT,
                "request_timeout",
                "Request timed out",
                true,
            )
        })
}
