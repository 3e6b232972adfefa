/// Task board endpoints
///
/// # Endpoints
///
/// - `GET /tasks` - List every task
/// - `POST /tasks` - Create a task in `A Fazer`
/// - `PATCH /tasks/:id` - Overwrite some fields of a task
/// - `DELETE /tasks/:id` - Delete a task

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{ApiJson, ApiPath},
};
use axum::{extract::State, http::StatusCode, Json};
use kanban_shared::{
    models::task::{CreateTask, Task, TaskPatch},
    rules::FieldErrors,
    wire::MessageResponse,
};
use validator::Validate;

fn task_not_found() -> ApiError {
    ApiError::NotFound("Tarefa não encontrada".to_string())
}

/// Fails unless a user with `usuario` exists
async fn ensure_user_exists(state: &AppState, usuario: i64, message: String) -> ApiResult<()> {
    if state.users.find(usuario).await?.is_none() {
        return Err(ApiError::Validation(FieldErrors::single("usuario", message)));
    }
    Ok(())
}

/// List tasks
///
/// # Endpoint
///
/// ```text
/// GET /tasks
/// ```
///
/// # Response
///
/// ```json
/// [
///   {
///     "id": 1,
///     "descricao": "Revisar relatório",
///     "setor": "TI",
///     "usuario": 1,
///     "prioridade": "Alta",
///     "status": "A Fazer"
///   }
/// ]
/// ```
pub async fn list_tasks(State(state): State<AppState>) -> ApiResult<Json<Vec<Task>>> {
    Ok(Json(state.tasks.list().await?))
}

/// Create task
///
/// The assigned user must exist. The new task always starts in `A Fazer`.
///
/// # Endpoint
///
/// ```text
/// POST /tasks
/// Content-Type: application/json
///
/// {
///   "descricao": "Revisar relatório",
///   "setor": "TI",
///   "usuario": 1,
///   "prioridade": "Alta"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed, or `usuario` does not exist
/// - `500 Internal Server Error`: Storage failure
pub async fn create_task(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateTask>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    req.validate()?;

    ensure_user_exists(&state, req.usuario, "Este usuário não existe".to_string()).await?;

    let task = state.tasks.append(req).await?;
    tracing::info!(task_id = task.id, usuario = task.usuario, "Task created");

    Ok((StatusCode::CREATED, Json(task)))
}

/// Patch task
///
/// Provided fields overwrite the stored ones verbatim. Moving a task between
/// columns is a patch of `status` alone.
///
/// # Endpoint
///
/// ```text
/// PATCH /tasks/:id
/// Content-Type: application/json
///
/// { "status": "Fazendo" }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Unknown field or bad value, or `usuario` does not exist
/// - `404 Not Found`: No task with this id
pub async fn patch_task(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(patch): ApiJson<TaskPatch>,
) -> ApiResult<Json<Task>> {
    if state.tasks.find(id).await?.is_none() {
        return Err(task_not_found());
    }

    if let Some(usuario) = patch.usuario {
        ensure_user_exists(
            &state,
            usuario,
            format!("Usuário com id {} não existe", usuario),
        )
        .await?;
    }

    let task = state
        .tasks
        .modify(id, Box::new(move |task: &mut Task| patch.apply(task)))
        .await?
        .ok_or_else(task_not_found)?;
    tracing::info!(task_id = task.id, status = %task.status, "Task updated");

    Ok(Json(task))
}

/// Delete task
///
/// # Endpoint
///
/// ```text
/// DELETE /tasks/:id
/// ```
///
/// # Response
///
/// ```json
/// { "message": "Tarefa deletada com sucesso" }
/// ```
///
/// # Errors
///
/// - `404 Not Found`: No task with this id
pub async fn delete_task(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<MessageResponse>> {
    state.tasks.remove(id).await?.ok_or_else(task_not_found)?;
    tracing::info!(task_id = id, "Task deleted");

    Ok(Json(MessageResponse::new("Tarefa deletada com sucesso")))
}
