use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use crate::status::{assemble::AssembleError, source::SourceError};
use super::negotiate::Rejection;

/// Everything that can end a request without a 200 or 304.
#[derive(Debug, Error)]
pub enum ServeError {
    #[error(transparent)]
    Rejected(#[from] Rejection),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("Inconsistent status file: {0}")]
    Integrity(#[from] AssembleError),

    #[error("Failed to render response: {0}")]
    Render(#[from] serde_json::Error),
}

impl ServeError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServeError::Rejected(rejection) => rejection.status_code(),
            ServeError::Source(_) | ServeError::Integrity(_) | ServeError::Render(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Bodies are empty; the cause only goes to the log.
impl IntoResponse for ServeError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Failed to serve status: {}", self);
        } else {
            tracing::debug!(status = status.as_u16(), "Rejected request: {}", self);
        }
        status.into_response()
    }
}
