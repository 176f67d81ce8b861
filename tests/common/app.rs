//! Test application factory for integration tests.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use std::sync::Arc;
use tower::ServiceExt;

use inkline::models::AppConfig;
use inkline::server::{build_router, create_app_state_with_store, AppState};
use inkline::services::{BlobStore, InMemoryBlobStore};

use super::fixtures;

/// Test application with router and direct access to the blob store
pub struct TestApp {
    router: axum::Router,
    pub store: Arc<InMemoryBlobStore>,
}

impl TestApp {
    /// Create a new test application with the default config and an in-memory store
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    pub fn with_config(config: AppConfig) -> Self {
        let store = Arc::new(InMemoryBlobStore::new());
        let state = create_app_state_with_store(config, store.clone());

        // Build router using shared server module (same as production)
        let router = build_router(state);

        Self { router, store }
    }

    /// Create application state for custom router configuration
    pub fn create_state() -> AppState {
        create_app_state_with_store(AppConfig::default(), Arc::new(InMemoryBlobStore::new()))
    }

    /// Make a GET request to the given path
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request(Request::get(path).body(Body::empty()).unwrap())
            .await
    }

    /// Make a POST request with JSON body
    pub async fn post_json(&self, path: &str, body: &serde_json::Value) -> TestResponse {
        let request = Request::post(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.request(request).await
    }

    /// POST a single-file multipart form
    pub async fn post_file(
        &self,
        path: &str,
        field: &str,
        file_name: &str,
        content_type: &str,
        bytes: &[u8],
    ) -> TestResponse {
        let body = fixtures::multipart_body(field, file_name, content_type, bytes);
        let request = Request::post(path)
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={}", fixtures::BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap();
        self.request(request).await
    }

    /// Upload an image and return its reference
    pub async fn upload(&self, file_name: &str, bytes: &[u8]) -> String {
        let response = self
            .post_file("/api/upload", "image", file_name, "image/png", bytes)
            .await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.text());

        let json: serde_json::Value = response.json();
        json["filename"].as_str().unwrap().to_string()
    }

    /// Send a request to the router
    async fn request(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Request failed");

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes()
            .to_vec();

        TestResponse {
            status,
            headers,
            body,
        }
    }
}

/// Start a real server on an available port and return its base URL.
pub async fn spawn_server(config: AppConfig) -> String {
    let state = create_app_state_with_store(config, Arc::new(InMemoryBlobStore::new()));
    let app = build_router(state);

    // Bind to port 0 to get an available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    format!("http://127.0.0.1:{port}")
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// Test response with convenience methods
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    /// Parse body as JSON
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> T {
        serde_json::from_slice(&self.body).expect("Failed to parse JSON response")
    }

    /// Get body as string
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }

    /// Get raw body bytes
    pub fn bytes(&self) -> &[u8] {
        &self.body
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Check if response is a PNG image
    pub fn is_png(&self) -> bool {
        self.body.len() >= 8 && &self.body[0..8] == b"\x89PNG\r\n\x1a\n"
    }
}
