/// Error handling for the API server
///
/// This module provides a unified error type that maps to HTTP responses.
/// All handlers return `Result<T, ApiError>` which automatically converts to
/// the appropriate status code and a JSON [`ErrorResponse`] body.
///
/// # Mapping
///
/// | Variant | Status | `error` |
/// |---|---|---|
/// | `Validation` | 400 | `validation_error` |
/// | `BadRequest` | 400 | `bad_request` |
/// | `NotFound` | 404 | `not_found` |
/// | `Internal` | 500 | `internal_error` |
///
/// # Example
///
/// ```
/// use kanban_api::error::{ApiError, ApiResult};
/// use kanban_shared::rules::FieldErrors;
///
/// fn check_owner(exists: bool) -> ApiResult<()> {
///     if !exists {
///         return Err(ApiError::Validation(FieldErrors::single(
///             "usuario",
///             "Este usuário não existe",
///         )));
///     }
///     Ok(())
/// }
/// ```

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use kanban_shared::{rules::FieldErrors, store::StoreError, wire::ErrorResponse};
use std::fmt;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Field validation failed, including references to unknown users and
    /// duplicate emails (400)
    Validation(FieldErrors),

    /// Malformed request that is not tied to a field (400)
    BadRequest(String),

    /// Unknown record id (404)
    NotFound(String),

    /// Internal server error (500)
    Internal(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Validation(errors) => {
                write!(f, "Validation failed: {} fields", errors.len())
            }
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match self {
            ApiError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                "Request validation failed".to_string(),
                Some(errors),
            ),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::Internal(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

/// Convert store errors to API errors
impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Internal(format!("Storage error: {}", err))
    }
}

/// Convert payload validation failures to API errors
impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::Validation(FieldErrors::from(errors))
    }
}

/// Convert JSON body rejections to API errors
///
/// Data errors (missing, unknown or mistyped fields, unknown enum values)
/// become field-keyed validation errors; everything else is a plain bad
/// request.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(err) => {
                let (field, message) = describe_data_error(&err.body_text());
                ApiError::Validation(FieldErrors::single(field, message))
            }
            other => ApiError::BadRequest(other.body_text()),
        }
    }
}

/// Convert path rejections (e.g. a non-numeric id) to API errors
impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

const DATA_ERROR_PREFIX: &str = "Failed to deserialize the JSON body into the target type: ";

/// Splits a serde data error into the offending field and a message
///
/// Falls back to the `body` pseudo-field when no field can be identified.
fn describe_data_error(text: &str) -> (String, String) {
    let detail = text.strip_prefix(DATA_ERROR_PREFIX).unwrap_or(text);
    let detail = match detail.rfind(" at line ") {
        Some(pos) => &detail[..pos],
        None => detail,
    };

    if let Some(field) = quoted_after(detail, "missing field `") {
        return (field, "Campo obrigatório".to_string());
    }
    if let Some(field) = quoted_after(detail, "unknown field `") {
        return (field, "Campo não permitido".to_string());
    }

    if let Some((path, message)) = detail.split_once(": ") {
        let is_path = !path.is_empty()
            && path
                .chars()
                .all(|c| c.is_alphanumeric() || matches!(c, '_' | '.' | '[' | ']'));
        if is_path {
            return (path.to_string(), message.to_string());
        }
    }

    ("body".to_string(), detail.to_string())
}

fn quoted_after(text: &str, marker: &str) -> Option<String> {
    let start = text.find(marker)? + marker.len();
    let end = text[start..].find('`')? + start;
    Some(text[start..end].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ApiError::BadRequest("Invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: Invalid input");

        let err = ApiError::NotFound("Tarefa não encontrada".to_string());
        assert_eq!(err.to_string(), "Not found: Tarefa não encontrada");
    }

    #[test]
    fn test_validation_error() {
        let mut errors = FieldErrors::new();
        errors.add("email", "Email inválido");
        errors.add("nome", "Mínimo de 3 caracteres");

        let err = ApiError::Validation(errors);
        assert_eq!(err.to_string(), "Validation failed: 2 fields");
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::NotFound("x".to_string()).into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Internal("disk full".to_string()).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_describe_missing_field() {
        let (field, message) = describe_data_error(
            "Failed to deserialize the JSON body into the target type: missing field `setor` at line 1 column 40",
        );
        assert_eq!(field, "setor");
        assert_eq!(message, "Campo obrigatório");
    }

    #[test]
    fn test_describe_unknown_field() {
        let (field, message) = describe_data_error(
            "Failed to deserialize the JSON body into the target type: unknown field `status`, expected one of `descricao`, `setor`, `usuario`, `prioridade` at line 1 column 9",
        );
        assert_eq!(field, "status");
        assert_eq!(message, "Campo não permitido");
    }

    #[test]
    fn test_describe_nested_path() {
        let (field, message) = describe_data_error(
            "Failed to deserialize the JSON body into the target type: prioridade: unknown variant `Urgente`, expected one of `Alta`, `Media`, `Baixa` at line 1 column 70",
        );
        assert_eq!(field, "prioridade");
        assert!(message.starts_with("unknown variant `Urgente`"));
    }

    #[test]
    fn test_describe_fallback() {
        let (field, message) = describe_data_error(
            "Failed to deserialize the JSON body into the target type: invalid type: integer `3`, expected a sequence",
        );
        assert_eq!(field, "body");
        assert_eq!(message, "invalid type: integer `3`, expected a sequence");
    }
}
