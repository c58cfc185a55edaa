use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{backend::BackendError, controller::ControllerError};

/// Structured error returned by the JSON API.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Machine-readable code: `VALIDATION_ERROR`, `UNAUTHORIZED`, `FORBIDDEN`,
    /// `NOT_FOUND`, `NOT_EDITING`, `BACKEND_ERROR` or `INTERNAL_ERROR`
    #[schema(example = "NOT_FOUND")]
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Controller(#[from] ControllerError),
}

impl ApiError {
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        let backend = match self {
            Self::Validation(_) => return (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            Self::Controller(ControllerError::UnknownNote(_)) => {
                return (StatusCode::NOT_FOUND, "NOT_FOUND");
            }
            Self::Controller(ControllerError::NotEditing) => {
                return (StatusCode::CONFLICT, "NOT_EDITING");
            }
            Self::Controller(e) => e.backend(),
        };

        match backend {
            Some(BackendError::Unauthorized) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Some(BackendError::Forbidden(_)) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            Some(BackendError::NotFound(_)) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Some(BackendError::Transport(_) | BackendError::Status { .. }) => {
                (StatusCode::BAD_GATEWAY, "BACKEND_ERROR")
            }
            Some(BackendError::Config(_)) | None => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::warn!("Request rejected: {}", self);
        }

        let body = ErrorBody {
            code,
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
