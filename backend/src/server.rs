use std::sync::Arc;
use std::time::Duration;

use aide::openapi::OpenApi;
use axum::{extract::DefaultBodyLimit, Extension};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::routes;
use crate::{
    gallery::ImageGallery,
    middleware::RequestTimeout,
    session::SessionManager,
    types::{vars, ConfigError, Environment},
};

const DEFAULT_PORT: u16 = 8001;

/// Default cap on a whole request body, all files of a batch included
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Limit for every route but upload
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Listener settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    pub max_upload_bytes: usize,
    pub request_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl ServerConfig {
    /// Reads `PORT`, `MAX_UPLOAD_BYTES` and `REQUEST_TIMEOUT_SECS`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if a variable is not a number
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(&vars::process_env)
    }

    /// See [`ServerConfig::from_env`]
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if a variable is not a number
    pub fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            port: vars::parsed(lookup, "PORT")?.unwrap_or(DEFAULT_PORT),
            max_upload_bytes: vars::parsed(lookup, "MAX_UPLOAD_BYTES")?
                .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
            request_timeout: vars::parsed(lookup, "REQUEST_TIMEOUT_SECS")?
                .map_or(DEFAULT_REQUEST_TIMEOUT, Duration::from_secs),
        })
    }
}

/// Builds the application router with its dependencies attached
pub fn router(
    environment: Environment,
    config: ServerConfig,
    gallery: Arc<ImageGallery>,
    sessions: Arc<SessionManager>,
) -> axum::Router {
    let mut openapi = OpenApi::default();

    routes::handler()
        .finish_api(&mut openapi)
        .layer(Extension(openapi))
        .layer(Extension(environment))
        .layer(Extension(gallery))
        .layer(Extension(sessions))
        .layer(Extension(RequestTimeout(config.request_timeout)))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
}

/// Starts the server with the given environment and dependencies
///
/// # Errors
///
/// Returns an error if the server fails to start or bind to the port
pub async fn start(
    environment: Environment,
    config: ServerConfig,
    gallery: Arc<ImageGallery>,
    sessions: Arc<SessionManager>,
) -> anyhow::Result<()> {
    let router = router(environment, config, gallery, sessions);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.port));

    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%environment, "🔄 Image Gateway started on http://{addr}");

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(anyhow::Error::from)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!("Failed to listen for SIGTERM: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections");
}
