use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Failures the sharing service can hand back to a client.
///
/// Every variant maps to an HTTP status plus a short text body; nothing here
/// is allowed to propagate past a handler and take the listener down.
#[derive(Debug, Error)]
pub enum ShareError {
    #[error("no shared file at index {index} (registry holds {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("shared file is no longer readable: {0}")]
    Unreadable(std::io::Error),

    #[error("No files shared")]
    NothingShared,

    #[error("archive failed: {0:#}")]
    Archive(anyhow::Error),
}

impl IntoResponse for ShareError {
    fn into_response(self) -> Response {
        let status = match &self {
            ShareError::IndexOutOfRange { .. } | ShareError::NothingShared => {
                StatusCode::NOT_FOUND
            }
            ShareError::Unreadable(_) | ShareError::Archive(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, self.to_string()).into_response()
    }
}
