use std::sync::Arc;
use std::time::Duration;

use axum::{body::Body, http::Request, response::Response, Router};
use image_gateway::{
    gallery::ImageGallery,
    object_store::memory::InMemoryObjectStore,
    server::{self, ServerConfig, DEFAULT_REQUEST_TIMEOUT},
    session::{SessionConfig, SessionManager, SESSION_TTL},
    types::{Environment, StorageConfig},
};
use tower::ServiceExt;

use super::utils::{multipart_body, TestFile};

pub const TEST_PASSWORD: &str = "correct horse battery staple";
pub const TEST_BUCKET: &str = "test-images";
pub const TEST_ENDPOINT: &str = "http://localhost:4566";

/// Small enough that a test can exceed it cheaply
pub const TEST_MAX_UPLOAD_BYTES: usize = 64 * 1024;

/// Initialize tracing for tests
pub fn setup_test_env() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init()
        .ok();
}

/// Full router over an in-memory bucket
pub struct TestSetup {
    pub router: Router,
    pub store: Arc<InMemoryObjectStore>,
    pub sessions: Arc<SessionManager>,
    pub storage_config: StorageConfig,
}

impl TestSetup {
    pub fn new() -> Self {
        Self::with_store(InMemoryObjectStore::new())
    }

    pub fn with_store(store: InMemoryObjectStore) -> Self {
        Self::build(store, Environment::Development, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Router as deployed in `environment`
    pub fn with_environment(environment: Environment) -> Self {
        Self::build(InMemoryObjectStore::new(), environment, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_request_timeout(store: InMemoryObjectStore, request_timeout: Duration) -> Self {
        Self::build(store, Environment::Development, request_timeout)
    }

    fn build(
        store: InMemoryObjectStore,
        environment: Environment,
        request_timeout: Duration,
    ) -> Self {
        setup_test_env();

        let storage_config = StorageConfig {
            endpoint: Some(TEST_ENDPOINT.to_string()),
            force_path_style: true,
            ..StorageConfig::for_bucket(TEST_BUCKET)
        };

        let sessions = Arc::new(SessionManager::new(SessionConfig {
            access_password: Some(TEST_PASSWORD.to_string()),
            secret: b"integration-test-secret-0123456789".to_vec(),
            secure_cookies: false,
            ttl: SESSION_TTL,
        }));

        let store = Arc::new(store);
        let gallery = Arc::new(ImageGallery::new(
            store.clone(),
            &storage_config,
            sessions.clone(),
        ));

        let config = ServerConfig {
            max_upload_bytes: TEST_MAX_UPLOAD_BYTES,
            request_timeout,
            ..ServerConfig::default()
        };
        let router = server::router(environment, config, gallery, sessions.clone());

        Self {
            router,
            store,
            sessions,
            storage_config,
        }
    }

    /// `Cookie` header value of a freshly issued session
    pub fn session_cookie(&self) -> String {
        let marker = self.sessions.issue().expect("Failed to issue session");
        format!("auth={marker}")
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("Router is infallible")
    }

    pub async fn send_post_request(
        &self,
        route: &str,
        payload: serde_json::Value,
        cookie: Option<&str>,
    ) -> Response {
        let mut builder = Request::builder()
            .uri(route)
            .method("POST")
            .header("Content-Type", "application/json");
        if let Some(cookie) = cookie {
            builder = builder.header("Cookie", cookie);
        }

        self.send(builder.body(Body::from(payload.to_string())).unwrap())
            .await
    }

    /// Posts `files` as a multipart body to the upload route
    pub async fn send_upload_request(&self, files: &[TestFile], cookie: Option<&str>) -> Response {
        let (content_type, body) = multipart_body(files);
        let mut builder = Request::builder()
            .uri("/api/upload")
            .method("POST")
            .header("Content-Type", content_type);
        if let Some(cookie) = cookie {
            builder = builder.header("Cookie", cookie);
        }

        self.send(builder.body(Body::from(body)).unwrap()).await
    }

    pub async fn send_get_request(&self, route: &str, cookie: Option<&str>) -> Response {
        let mut builder = Request::builder().uri(route).method("GET");
        if let Some(cookie) = cookie {
            builder = builder.header("Cookie", cookie);
        }

        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn send_delete_request(&self, route: &str, cookie: Option<&str>) -> Response {
        let mut builder = Request::builder().uri(route).method("DELETE");
        if let Some(cookie) = cookie {
            builder = builder.header("Cookie", cookie);
        }

        self.send(builder.body(Body::empty()).unwrap()).await
    }
}
