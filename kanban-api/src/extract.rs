/// Request extractors
///
/// Thin wrappers over axum's `Json` and `Path` extractors whose rejections are
/// converted into [`ApiError`], so malformed bodies and ids produce the same
/// JSON error shape as every other failure.
///
/// # Example
///
/// ```
/// use kanban_api::extract::{ApiJson, ApiPath};
/// use kanban_shared::models::task::TaskPatch;
///
/// async fn handler(ApiPath(id): ApiPath<i64>, ApiJson(patch): ApiJson<TaskPatch>) {
///     let _ = (id, patch);
/// }
/// ```

use crate::error::ApiError;
use axum::extract::{FromRequest, FromRequestParts};

/// JSON body extractor rejecting with [`ApiError`]
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Path parameter extractor rejecting with [`ApiError`]
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);
