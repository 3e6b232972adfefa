/// User-facing feedback for board and form actions
///
/// Every mutation the client performs ends in exactly one [`Notice`]: a
/// success or error headline, optionally with the server's explanation.

use crate::api::ClientError;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    /// Extra explanation, e.g. the server's rejection message
    pub detail: Option<String>,
}

impl Notice {
    pub fn success(title: impl Into<String>) -> Self {
        Notice {
            kind: NoticeKind::Success,
            title: title.into(),
            detail: None,
        }
    }

    pub fn error(title: impl Into<String>, detail: impl Into<String>) -> Self {
        Notice {
            kind: NoticeKind::Error,
            title: title.into(),
            detail: Some(detail.into()),
        }
    }

    /// Error notice explaining a failed request
    pub fn failed(title: impl Into<String>, err: &ClientError) -> Self {
        tracing::warn!(error = %err, "request failed");
        Self::error(title, err.user_message())
    }

    pub fn is_success(&self) -> bool {
        self.kind == NoticeKind::Success
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.detail {
            Some(detail) => write!(f, "{} ({})", self.title, detail),
            None => f.write_str(&self.title),
        }
    }
}
