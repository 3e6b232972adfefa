/// Common test utilities for integration tests
///
/// This module provides shared infrastructure for integration tests:
/// - A router over JSON collection files in a fresh temporary directory
/// - Request helpers returning the status and decoded JSON body
/// - Fixture users and tasks

use axum::body::Body;
use axum::http::{Request, StatusCode};
use kanban_api::app::{build_router, AppState};
use kanban_api::config::Config;
use serde_json::{json, Value};
use std::path::PathBuf;
use tempfile::TempDir;
use tower::Service as _;

/// Test context containing all necessary resources
pub struct TestContext {
    pub app: axum::Router,
    pub config: Config,
    /// Keeps the data directory alive for the test's duration
    pub dir: TempDir,
}

impl TestContext {
    /// Creates a context with empty collections
    pub fn new() -> anyhow::Result<Self> {
        let dir = tempfile::tempdir()?;
        let config = Config::local(dir.path());
        let app = build_router(AppState::new(config.clone()));

        Ok(TestContext { app, config, dir })
    }

    pub fn tasks_file(&self) -> PathBuf {
        self.config.storage.tasks_file.clone()
    }

    pub fn users_file(&self) -> PathBuf {
        self.config.storage.users_file.clone()
    }

    /// Sends a request and returns the status with the decoded body
    ///
    /// An empty body decodes to `Value::Null`.
    pub async fn send(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .app
            .clone()
            .call(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        (status, value)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send("GET", uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send("POST", uri, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send("PATCH", uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.send("DELETE", uri, None).await
    }

    /// Registers a user and returns its id
    pub async fn create_user(&self, nome: &str, email: &str) -> i64 {
        let (status, body) = self
            .post("/users", json!({ "nome": nome, "email": email }))
            .await;
        assert_eq!(status, StatusCode::CREATED, "unexpected body: {}", body);
        body["id"].as_i64().unwrap()
    }

    /// Creates a task for `usuario` and returns its id
    pub async fn create_task(&self, descricao: &str, usuario: i64) -> i64 {
        let (status, body) = self
            .post(
                "/tasks",
                json!({
                    "descricao": descricao,
                    "setor": "TI",
                    "usuario": usuario,
                    "prioridade": "Alta"
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "unexpected body: {}", body);
        body["id"].as_i64().unwrap()
    }

    /// Reads a collection file straight from disk
    pub fn read_file(&self, path: &PathBuf) -> Value {
        let text = std::fs::read_to_string(path).unwrap();
        serde_json::from_str(&text).unwrap()
    }
}
