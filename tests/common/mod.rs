//! Shared helpers for HTTP integration tests
#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use globalbudget::api::{router, AppState};
use globalbudget::config::{BudgetPaths, Settings};
use globalbudget::storage::Storage;

pub const TOKEN: &str = "test-token";

/// Drives the router in-process against a throwaway data directory
pub struct TestClient {
    pub dir: TempDir,
    pub storage: Arc<Storage>,
    router: Router,
}

impl TestClient {
    pub fn new() -> Self {
        Self::with_files(|_| {})
    }

    /// Like [`new`](Self::new), letting `prepare` write files before storage opens
    pub fn with_files(prepare: impl FnOnce(&BudgetPaths)) -> Self {
        let dir = TempDir::new().expect("temp dir");
        let paths = BudgetPaths::with_base_dir(dir.path().to_path_buf());
        paths.ensure_directories().expect("create dirs");
        prepare(&paths);

        let storage = Arc::new(Storage::open(paths).expect("open storage"));
        let router = router(AppState::new(storage.clone(), Settings::default()));
        Self {
            dir,
            storage,
            router,
        }
    }

    pub fn base_dir(&self) -> &Path {
        self.dir.path()
    }

    /// Send a request; returns status, headers and the raw body
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> (StatusCode, HeaderMap, String) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("read body")
            .to_bytes();
        (status, headers, String::from_utf8_lossy(&bytes).into_owned())
    }

    async fn json(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let (status, _, text) = self.send(method, uri, body, Some(TOKEN)).await;
        let value = serde_json::from_str(&text).unwrap_or(Value::Null);
        (status, value)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.json(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.json(Method::POST, uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.json(Method::PUT, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.json(Method::DELETE, uri, None).await
    }

    /// Create a department and return its id
    pub async fn create_department(&self, name: &str, budget: i64) -> String {
        let (status, body) = self
            .post("/api/departments", json!({"name": name, "budget": budget}))
            .await;
        assert_eq!(status, StatusCode::CREATED, "create department: {}", body);
        body["data"]["id"].as_str().expect("department id").to_string()
    }

    /// Record a transaction and return the response data
    pub async fn create_transaction(&self, body: Value) -> Value {
        let (status, response) = self.post("/api/transactions", body).await;
        assert_eq!(status, StatusCode::CREATED, "create transaction: {}", response);
        response["data"].clone()
    }
}
