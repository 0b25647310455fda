use axum::{
    Json,
    extract::rejection::PathRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

use gadder_core::CoreError;

/// Handler error rendered as `{"error": message}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let status = match &err {
            CoreError::MissingCredential
            | CoreError::IdentityMismatch
            | CoreError::Forbidden
            | CoreError::InvalidParam(_) => StatusCode::BAD_REQUEST,
            CoreError::SessionNotFound(_) | CoreError::UserNotFound | CoreError::NotFound(_) => {
                StatusCode::NOT_FOUND
            }
            CoreError::StoreUnavailable(e) => {
                // Storage details stay in the log.
                error!("Store error: {}", e);
                return Self::internal("internal server error");
            }
        };

        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}
