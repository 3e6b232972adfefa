/// Kanban API client
///
/// This module defines the contract the board and forms use to reach the
/// server, plus the HTTP implementation of it.
///
/// # Contract
///
/// [`KanbanApi`] mirrors the REST surface one method per endpoint. Every
/// call is a single request; failures are returned, never retried.
///
/// # Errors
///
/// ```text
/// send ─┬─> transport failure          -> ClientError::Http
///       ├─> non-2xx with a JSON body   -> ClientError::Rejected (server's ErrorResponse)
///       ├─> non-2xx without one        -> ClientError::Rejected (synthesized body)
///       └─> 2xx with an unexpected body -> ClientError::Decode
/// ```
///
/// # Example
///
/// ```no_run
/// use kanban_client::api::{HttpClient, KanbanApi};
///
/// # async fn example() -> Result<(), kanban_client::api::ClientError> {
/// let api = HttpClient::new("http://127.0.0.1:3000");
/// for task in api.list_tasks().await? {
///     println!("{} [{}]", task.descricao, task.status);
/// }
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use kanban_shared::{
    models::{
        task::{CreateTask, Task, TaskPatch},
        user::{CreateUser, User, UserPatch},
    },
    wire::{ErrorResponse, MessageResponse},
};
use serde::de::DeserializeOwned;

/// Client error types
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The request never produced a response
    #[error("{method} {url} failed: {source}")]
    Http {
        method: &'static str,
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with an error status
    #[error("server rejected the request ({status}): {}", error.headline())]
    Rejected { status: u16, error: ErrorResponse },

    /// The server answered 2xx with a body of the wrong shape
    #[error("unexpected response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ClientError {
    /// Text suitable for showing to the person using the board
    ///
    /// For rejections this is the server's own message, e.g. the duplicate
    /// email explanation.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Rejected { error, .. } => error.headline().to_string(),
            other => other.to_string(),
        }
    }

    /// HTTP status of a rejection
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Client result type alias
pub type ClientResult<T> = Result<T, ClientError>;

/// Operations offered by the Kanban server
#[async_trait]
pub trait KanbanApi: Send + Sync {
    async fn list_tasks(&self) -> ClientResult<Vec<Task>>;

    async fn create_task(&self, task: &CreateTask) -> ClientResult<Task>;

    async fn patch_task(&self, id: i64, patch: &TaskPatch) -> ClientResult<Task>;

    async fn delete_task(&self, id: i64) -> ClientResult<MessageResponse>;

    async fn list_users(&self) -> ClientResult<Vec<User>>;

    async fn create_user(&self, user: &CreateUser) -> ClientResult<User>;

    async fn patch_user(&self, id: i64, patch: &UserPatch) -> ClientResult<User>;

    async fn delete_user(&self, id: i64) -> ClientResult<MessageResponse>;
}

/// [`KanbanApi`] over HTTP
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpClient {
    /// Creates a client for the server at `base_url` (e.g. `http://127.0.0.1:3000`)
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        rb: reqwest::RequestBuilder,
        method: &'static str,
        url: &str,
    ) -> ClientResult<T> {
        let http_error = |source| ClientError::Http {
            method,
            url: url.to_string(),
            source,
        };

        let resp = rb.send().await.map_err(http_error)?;
        let status = resp.status();
        let body = resp.text().await.map_err(http_error)?;

        if !status.is_success() {
            tracing::debug!(method, url, status = status.as_u16(), "request rejected");
            let error = serde_json::from_str::<ErrorResponse>(&body).unwrap_or_else(|_| {
                ErrorResponse {
                    error: "http_error".to_string(),
                    message: if body.trim().is_empty() {
                        status.to_string()
                    } else {
                        body.clone()
                    },
                    details: None,
                }
            });
            return Err(ClientError::Rejected {
                status: status.as_u16(),
                error,
            });
        }

        serde_json::from_str(&body).map_err(|source| ClientError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

#[async_trait]
impl KanbanApi for HttpClient {
    async fn list_tasks(&self) -> ClientResult<Vec<Task>> {
        let url = self.url("/tasks");
        self.send_json(self.client.get(&url), "GET", &url).await
    }

    async fn create_task(&self, task: &CreateTask) -> ClientResult<Task> {
        let url = self.url("/tasks");
        self.send_json(self.client.post(&url).json(task), "POST", &url)
            .await
    }

    async fn patch_task(&self, id: i64, patch: &TaskPatch) -> ClientResult<Task> {
        let url = self.url(&format!("/tasks/{}", id));
        self.send_json(self.client.patch(&url).json(patch), "PATCH", &url)
            .await
    }

    async fn delete_task(&self, id: i64) -> ClientResult<MessageResponse> {
        let url = self.url(&format!("/tasks/{}", id));
        self.send_json(self.client.delete(&url), "DELETE", &url).await
    }

    async fn list_users(&self) -> ClientResult<Vec<User>> {
        let url = self.url("/users");
        self.send_json(self.client.get(&url), "GET", &url).await
    }

    async fn create_user(&self, user: &CreateUser) -> ClientResult<User> {
        let url = self.url("/users");
        self.send_json(self.client.post(&url).json(user), "POST", &url)
            .await
    }

    async fn patch_user(&self, id: i64, patch: &UserPatch) -> ClientResult<User> {
        let url = self.url(&format!("/users/{}", id));
        self.send_json(self.client.patch(&url).json(patch), "PATCH", &url)
            .await
    }

    async fn delete_user(&self, id: i64) -> ClientResult<MessageResponse> {
        let url = self.url(&format!("/users/{}", id));
        self.send_json(self.client.delete(&url), "DELETE", &url).await
    }
}
