//! Mapping from domain errors to HTTP responses.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;

/// Error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

/// Handler error: a domain error rendered as `{error, code}`.
#[derive(Debug)]
pub struct ApiError(pub DomainError);

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self(DomainError::InvalidInput(message.into()))
    }

    pub const fn status(&self) -> StatusCode {
        match self.0 {
            DomainError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            DomainError::NotFound(_) => StatusCode::NOT_FOUND,
            DomainError::Conflict(_) => StatusCode::CONFLICT,
            DomainError::StorageFault(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::invalid(format!("Malformed request body: {}", rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.0.code().to_string();
        let error = match self.0 {
            DomainError::StorageFault(detail) => {
                tracing::error!(error = %detail, "storage fault while handling request");
                "Internal Server Error".to_string()
            }
            DomainError::InvalidInput(msg) | DomainError::NotFound(msg) | DomainError::Conflict(msg) => {
                tracing::debug!(%status, %code, error = %msg, "request rejected");
                msg
            }
        };

        (status, Json(ErrorResponse { error, code })).into_response()
    }
}
