/// User registry endpoints
///
/// # Endpoints
///
/// - `GET /users` - List every user
/// - `POST /users` - Register a user with a unique email
/// - `PATCH /users/:id` - Overwrite `nome` and/or `email`
/// - `DELETE /users/:id` - Delete a user (tasks keep their reference)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{ApiJson, ApiPath},
};
use axum::{extract::State, http::StatusCode, Json};
use kanban_shared::{
    models::user::{CreateUser, User, UserPatch},
    rules::FieldErrors,
    wire::MessageResponse,
};
use validator::Validate;

fn user_not_found() -> ApiError {
    ApiError::NotFound("Usuário não encontrado".to_string())
}

/// List users
///
/// # Endpoint
///
/// ```text
/// GET /users
/// ```
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<User>>> {
    Ok(Json(state.users.list().await?))
}

/// Register user
///
/// # Endpoint
///
/// ```text
/// POST /users
/// Content-Type: application/json
///
/// { "nome": "Ana Silva", "email": "ana@x.com" }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed, or the email is already registered
///   (exact, case-sensitive match)
pub async fn create_user(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateUser>,
) -> ApiResult<(StatusCode, Json<User>)> {
    req.validate()?;

    let email = req.email.clone();
    let user = state
        .users
        .append_unique(req, Box::new(move |u: &User| u.email == email))
        .await?
        .ok_or_else(|| {
            ApiError::Validation(FieldErrors::single(
                "email",
                "Email já cadastrado. Por favor use outro email",
            ))
        })?;
    tracing::info!(user_id = user.id, "User registered");

    Ok((StatusCode::CREATED, Json(user)))
}

/// Patch user
///
/// Email uniqueness is only enforced at registration.
///
/// # Endpoint
///
/// ```text
/// PATCH /users/:id
/// Content-Type: application/json
///
/// { "nome": "Ana Souza" }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Unknown field or bad value
/// - `404 Not Found`: No user with this id
pub async fn patch_user(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(patch): ApiJson<UserPatch>,
) -> ApiResult<Json<User>> {
    let user = state
        .users
        .modify(id, Box::new(move |user: &mut User| patch.apply(user)))
        .await?
        .ok_or_else(user_not_found)?;
    tracing::info!(user_id = user.id, "User updated");

    Ok(Json(user))
}

/// Delete user
///
/// Tasks assigned to the user are left untouched.
///
/// # Endpoint
///
/// ```text
/// DELETE /users/:id
/// ```
///
/// # Response
///
/// ```json
/// { "message": "Usuário deletado com sucesso" }
/// ```
pub async fn delete_user(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<MessageResponse>> {
    state.users.remove(id).await?.ok_or_else(user_not_found)?;
    tracing::info!(user_id = id, "User deleted");

    Ok(Json(MessageResponse::new("Usuário deletado com sucesso")))
}
