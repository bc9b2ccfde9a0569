//! Shared helpers for server integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use docpolish::ai::StubBackend;
use docpolish::{Config, DocumentService, JobId, JobState};
use docpolish_server::config::ServerConfig;
use docpolish_server::state::AppState;
use docpolish_server::ws::WsManager;
use docpolish_server::build_app;

pub const BOUNDARY: &str = "----docpolish-test-boundary";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        config_path: None,
        json_logs: false,
    }
}

pub struct TestApp {
    pub state: AppState,
    pub backend: Arc<StubBackend>,
}

impl TestApp {
    pub fn new(backend: StubBackend) -> Self {
        Self::with_config(Config::default(), backend)
    }

    pub fn with_config(config: Config, backend: StubBackend) -> Self {
        let backend = Arc::new(backend);
        let service = DocumentService::with_backend(config, backend.clone())
            .expect("Failed to build document service");
        let state = AppState {
            service: Arc::new(service),
            config: Arc::new(test_config()),
            ws_manager: Arc::new(WsManager::new()),
        };
        Self { state, backend }
    }

    /// A fresh router over the shared state.
    pub fn router(&self) -> Router {
        build_app(self.state.clone())
    }

    pub async fn wait_terminal(&self, id: &str) -> JobState {
        let id = JobId::from(id);
        let poll = async {
            loop {
                let job = self.state.service.status(&id).expect("job should exist");
                if job.state().is_terminal() {
                    return job.state();
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        };
        tokio::time::timeout(Duration::from_secs(10), poll)
            .await
            .expect("job did not settle")
    }
}

pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.expect("request failed")
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, json: serde_json::Value) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(json.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn post_empty(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

/// A multipart body with one file part named `field`.
pub fn multipart_body(field: &str, filename: &str, content: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub async fn upload(app: Router, field: &str, filename: &str, content: &[u8]) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri("/api/documents/upload")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(field, filename, content)))
        .unwrap();
    send(app, request).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("failed to read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body is not JSON")
}
