use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::entities::ValidationError;
use crate::store::StoreError;

/// Every failure a handler can surface to a caller.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("`{field}` does not match the path parameter")]
    InconsistentReference { field: &'static str },

    #[error("email already registered")]
    DuplicateEmail,

    /// Same message for unknown email and wrong password.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("{0}")]
    Unauthorized(&'static str),

    #[error("{0}")]
    Forbidden(&'static str),

    #[error("document store unavailable")]
    StorageUnavailable(#[source] StoreError),

    #[error("internal server error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "ValidationError",
            ApiError::InconsistentReference { .. } => "InconsistentReference",
            ApiError::DuplicateEmail => "DuplicateEmail",
            ApiError::InvalidCredentials => "InvalidCredentials",
            ApiError::Unauthorized(_) => "Unauthorized",
            ApiError::Forbidden(_) => "Forbidden",
            ApiError::StorageUnavailable(_) => "StorageUnavailable",
            ApiError::Internal(_) => "Internal",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_)
            | ApiError::InconsistentReference { .. }
            | ApiError::DuplicateEmail => StatusCode::BAD_REQUEST,
            ApiError::InvalidCredentials | ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            // The only unique index is on user email.
            StoreError::Duplicate(_) => ApiError::DuplicateEmail,
            StoreError::Codec(msg) => ApiError::Internal(anyhow::anyhow!(msg)),
            unavailable @ StoreError::Unavailable(_) => ApiError::StorageUnavailable(unavailable),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(ValidationError::Malformed(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Validation(ValidationError::Malformed(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            match &self {
                ApiError::StorageUnavailable(source) => error!(error = %source, "storage failure"),
                ApiError::Internal(source) => error!(error = ?source, "internal failure"),
                _ => error!(error = %self, "server error"),
            }
        } else {
            warn!(kind = self.kind(), error = %self, "request rejected");
        }

        let body = json!({
            "error": self.kind(),
            "message": self.to_string(),
        });
        (status, Json(body)).into_response()
    }
}
