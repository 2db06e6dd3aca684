mod auth;
mod docs;
mod health;
mod images;

use aide::axum::{
    routing::{delete, get, post},
    ApiRouter,
};
use axum::middleware;

use crate::middleware::request_timeout;

/// Creates the router with all handler routes
///
/// Upload stays outside the request timeout: dropping it mid-batch would cancel
/// writes already sent to the bucket.
pub fn handler() -> ApiRouter {
    let bounded_routes = ApiRouter::new()
        .merge(docs::handler())
        .api_route("/health", get(health::handler))
        .api_route("/api/login", post(auth::login))
        .api_route("/api/logout", post(auth::logout))
        .api_route("/api/images", get(images::list))
        .api_route("/api/images/{fileName}", delete(images::remove))
        .layer(middleware::from_fn(request_timeout));

    let upload_routes = ApiRouter::new().api_route("/api/upload", post(images::upload));

    bounded_routes.merge(upload_routes)
}
