/// Response bodies shared by the API server and its clients

use crate::rules::FieldErrors;
use serde::{Deserialize, Serialize};

/// Error response format
///
/// ```json
/// {
///   "error": "validation_error",
///   "message": "Request validation failed",
///   "details": { "email": ["Email já cadastrado. Por favor use outro email"] }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code (e.g., "validation_error", "not_found")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Field-keyed validation messages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<FieldErrors>,
}

impl ErrorResponse {
    /// Most specific message available: the first field message, else `message`
    pub fn headline(&self) -> &str {
        self.details
            .as_ref()
            .and_then(|d| d.iter().next())
            .and_then(|(_, messages)| messages.first())
            .map(String::as_str)
            .unwrap_or(&self.message)
    }
}

/// Confirmation body returned by deletes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
