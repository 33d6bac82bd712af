use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::assistant::AssistantError;
use crate::waitlist::WaitlistError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Waitlist(#[from] WaitlistError),
    #[error(transparent)]
    Assistant(#[from] AssistantError),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    InvalidInput(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Waitlist(WaitlistError::InvalidEmail(_))
            | AppError::Assistant(AssistantError::InvalidInput(_))
            | AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Waitlist(_) | AppError::Assistant(_) | AppError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_map_to_bad_request() {
        let err = AppError::from(WaitlistError::InvalidEmail("Email is required".into()));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Email is required");

        let err = AppError::from(AssistantError::InvalidInput("Query is required".into()));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn storage_errors_map_to_server_error() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let err = AppError::from(WaitlistError::Io(io));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
