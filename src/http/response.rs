//! Response handling.
//!
//! # Responsibilities
//! - Map manager errors to HTTP status codes
//! - Render error bodies as `{ "ok": false, "error": ... }`
//!
//! # Design Decisions
//! - Validation → 400, unknown name → 404, persistence/render → 500
//! - Reload failures after a mutation are not errors; handlers attach them
//!   as a `warning` on a success body instead

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::managed::{ManagerError, ReloadError};

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    PayloadTooLarge,
    Unauthorized,
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::BadRequest(m) | ApiError::NotFound(m) | ApiError::Internal(m) => m.clone(),
            ApiError::PayloadTooLarge => "Request body too large".to_string(),
            ApiError::Unauthorized => "Unauthorized".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(json!({ "ok": false, "error": self.message() }))).into_response()
    }
}

impl From<ManagerError> for ApiError {
    fn from(err: ManagerError) -> Self {
        match err {
            ManagerError::Validation { .. } => ApiError::BadRequest(err.to_string()),
            ManagerError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            ManagerError::Persistence(_)
            | ManagerError::Render(_)
            | ManagerError::Artifact { .. } => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<ReloadError> for ApiError {
    fn from(err: ReloadError) -> Self {
        ApiError::Internal(format!("Reload failed: {}", err))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge
        } else {
            ApiError::BadRequest(format!("Invalid JSON: {}", rejection.body_text()))
        }
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        tracing::error!(error = %err, "Manager task failed");
        ApiError::Internal("internal error".to_string())
    }
}
