/// In-process stand-in for the Kanban server
///
/// `MockApi` answers [`KanbanApi`] calls from in-memory collections, applying
/// the same referential checks as the server (existing `usuario`, unique
/// email, known ids). It's useful for:
/// - Testing the board and forms without a running server
/// - Counting the requests a board action sends
/// - Simulating a server that rejects every write, or every read
///
/// # Example
///
/// ```
/// use kanban_client::api::KanbanApi;
/// use kanban_client::mock::MockApi;
/// use kanban_shared::models::user::CreateUser;
///
/// # async fn example() -> Result<(), kanban_client::api::ClientError> {
/// let api = MockApi::new();
/// api.create_user(&CreateUser {
///     nome: "Ana Silva".to_string(),
///     email: "ana@x.com".to_string(),
/// })
/// .await?;
///
/// assert_eq!(api.list_users().await?.len(), 1);
/// assert_eq!(api.requests(), vec!["POST /users", "GET /users"]);
/// # Ok(())
/// # }
/// ```

use crate::api::{ClientError, ClientResult, KanbanApi};
use async_trait::async_trait;
use kanban_shared::{
    models::{
        task::{CreateTask, Task, TaskPatch},
        user::{CreateUser, User, UserPatch},
    },
    rules::FieldErrors,
    store::{MemoryStore, RecordStore, StoreError},
    wire::{ErrorResponse, MessageResponse},
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Mock API implementation
pub struct MockApi {
    tasks: MemoryStore<Task>,
    users: MemoryStore<User>,
    requests: Mutex<Vec<String>>,
    reject_writes: AtomicBool,
    reject_reads: AtomicBool,
}

impl MockApi {
    /// Creates a mock with empty collections
    pub fn new() -> Self {
        Self::with_records(Vec::new(), Vec::new())
    }

    /// Creates a mock seeded with existing records
    pub fn with_records(tasks: Vec<Task>, users: Vec<User>) -> Self {
        MockApi {
            tasks: MemoryStore::with_records(tasks),
            users: MemoryStore::with_records(users),
            requests: Mutex::new(Vec::new()),
            reject_writes: AtomicBool::new(false),
            reject_reads: AtomicBool::new(false),
        }
    }

    /// Makes every later POST, PATCH and DELETE fail with a 500
    pub fn reject_writes(&self, reject: bool) {
        self.reject_writes.store(reject, Ordering::SeqCst);
    }

    /// Makes every later GET fail with a 500
    pub fn reject_reads(&self, reject: bool) {
        self.reject_reads.store(reject, Ordering::SeqCst);
    }

    /// Requests received so far, as `"METHOD /path"`
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Forgets the recorded requests
    pub fn clear_requests(&self) {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }

    fn record(&self, method: &str, path: String) -> ClientResult<()> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(format!("{} {}", method, path));

        let rejecting = if method == "GET" {
            &self.reject_reads
        } else {
            &self.reject_writes
        };
        if rejecting.load(Ordering::SeqCst) {
            return Err(rejected(500, "internal_error", "An internal error occurred", None));
        }
        Ok(())
    }
}

impl Default for MockApi {
    fn default() -> Self {
        Self::new()
    }
}

fn rejected(
    status: u16,
    error: &str,
    message: &str,
    details: Option<FieldErrors>,
) -> ClientError {
    ClientError::Rejected {
        status,
        error: ErrorResponse {
            error: error.to_string(),
            message: message.to_string(),
            details,
        },
    }
}

fn invalid(field: &str, message: impl Into<String>) -> ClientError {
    rejected(
        400,
        "validation_error",
        "Request validation failed",
        Some(FieldErrors::single(field, message)),
    )
}

fn not_found(message: &str) -> ClientError {
    rejected(404, "not_found", message, None)
}

fn store_failure(err: StoreError) -> ClientError {
    rejected(500, "internal_error", &err.to_string(), None)
}

#[async_trait]
impl KanbanApi for MockApi {
    async fn list_tasks(&self) -> ClientResult<Vec<Task>> {
        self.record("GET", "/tasks".to_string())?;
        self.tasks.list().await.map_err(store_failure)
    }

    async fn create_task(&self, task: &CreateTask) -> ClientResult<Task> {
        self.record("POST", "/tasks".to_string())?;
        if self.users.find(task.usuario).await.map_err(store_failure)?.is_none() {
            return Err(invalid("usuario", "Este usuário não existe"));
        }
        self.tasks.append(task.clone()).await.map_err(store_failure)
    }

    async fn patch_task(&self, id: i64, patch: &TaskPatch) -> ClientResult<Task> {
        self.record("PATCH", format!("/tasks/{}", id))?;
        if self.tasks.find(id).await.map_err(store_failure)?.is_none() {
            return Err(not_found("Tarefa não encontrada"));
        }
        if let Some(usuario) = patch.usuario {
            if self.users.find(usuario).await.map_err(store_failure)?.is_none() {
                return Err(invalid(
                    "usuario",
                    format!("Usuário com id {} não existe", usuario),
                ));
            }
        }

        let patch = patch.clone();
        self.tasks
            .modify(id, Box::new(move |task: &mut Task| patch.apply(task)))
            .await
            .map_err(store_failure)?
            .ok_or_else(|| not_found("Tarefa não encontrada"))
    }

    async fn delete_task(&self, id: i64) -> ClientResult<MessageResponse> {
        self.record("DELETE", format!("/tasks/{}", id))?;
        self.tasks
            .remove(id)
            .await
            .map_err(store_failure)?
            .ok_or_else(|| not_found("Tarefa não encontrada"))?;
        Ok(MessageResponse::new("Tarefa deletada com sucesso"))
    }

    async fn list_users(&self) -> ClientResult<Vec<User>> {
        self.record("GET", "/users".to_string())?;
        self.users.list().await.map_err(store_failure)
    }

    async fn create_user(&self, user: &CreateUser) -> ClientResult<User> {
        self.record("POST", "/users".to_string())?;
        let email = user.email.clone();
        self.users
            .append_unique(user.clone(), Box::new(move |u: &User| u.email == email))
            .await
            .map_err(store_failure)?
            .ok_or_else(|| invalid("email", "Email já cadastrado. Por favor use outro email"))
    }

    async fn patch_user(&self, id: i64, patch: &UserPatch) -> ClientResult<User> {
        self.record("PATCH", format!("/users/{}", id))?;
        let patch = patch.clone();
        self.users
            .modify(id, Box::new(move |user: &mut User| patch.apply(user)))
            .await
            .map_err(store_failure)?
            .ok_or_else(|| not_found("Usuário não encontrado"))
    }

    async fn delete_user(&self, id: i64) -> ClientResult<MessageResponse> {
        self.record("DELETE", format!("/users/{}", id))?;
        self.users
            .remove(id)
            .await
            .map_err(store_failure)?
            .ok_or_else(|| not_found("Usuário não encontrado"))?;
        Ok(MessageResponse::new("Usuário deletado com sucesso"))
    }
}
