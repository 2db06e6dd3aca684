use aide::{axum::ApiRouter, openapi::OpenApi, scalar::Scalar};
use axum::{middleware, response::IntoResponse, routing::get, Extension, Json};

use crate::middleware::hide_docs_when_disabled;

/// Scalar page and the schema it loads, both hidden where docs are disabled
pub fn handler() -> ApiRouter {
    let scalar = Scalar::new("/openapi.json").with_title("Image Gateway Docs");

    ApiRouter::new()
        .route("/docs", scalar.axum_route())
        .route("/openapi.json", get(openapi_schema))
        .layer(middleware::from_fn(hide_docs_when_disabled))
}

#[allow(clippy::unused_async)]
async fn openapi_schema(Extension(openapi): Extension<OpenApi>) -> impl IntoResponse {
    Json(openapi)
}
