use std::sync::Arc;

use aws_sdk_s3::Client as S3Client;

use image_gateway::{
    gallery::ImageGallery,
    object_store::S3ObjectStore,
    server::{self, ServerConfig},
    session::{SessionConfig, SessionManager},
    types::{Environment, StorageConfig},
};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let environment = Environment::from_env()?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(environment.default_log_filter()));

    // JSON logs for staging/production, human-readable output for development
    if environment.is_deployed() {
        fmt().json().with_env_filter(filter).init();
    } else {
        fmt().with_env_filter(filter).init();
    }

    let storage_config = StorageConfig::from_env(environment)?;
    let session_config = SessionConfig::from_env(environment)?;
    let server_config = ServerConfig::from_env()?;

    let s3_client = Arc::new(S3Client::from_conf(
        environment.s3_client_config(&storage_config).await,
    ));
    let store = Arc::new(S3ObjectStore::new(
        s3_client,
        storage_config.bucket.clone(),
        storage_config.public_read_acl,
    ));

    let sessions = Arc::new(SessionManager::new(session_config));
    let gallery = Arc::new(ImageGallery::new(store, &storage_config, sessions.clone()));

    server::start(environment, server_config, gallery, sessions).await
}
