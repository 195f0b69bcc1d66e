//! Daemon and API error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use kiln_registry::RegistryError;
use kiln_types::TypeError;
use serde::Serialize;
use thiserror::Error;

/// Fatal daemon errors (startup/shutdown path)
#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("server error: {0}")]
    Server(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type for daemon lifecycle operations
pub type DaemonResult<T> = Result<T, DaemonError>;

/// Errors surfaced to API callers as structured responses
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or unresolved UUID
    #[error("{0}")]
    InvalidIdentifier(String),

    /// Caller outside the permitted host/subnet for a restricted endpoint
    #[error("{0}")]
    AccessForbidden(String),

    /// Backend delete reported failure for a resolved entity
    #[error("{0}")]
    RemovalFailed(String),

    /// Unexpected fault; not expected to recur, never retried
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidIdentifier(_) => StatusCode::BAD_REQUEST,
            ApiError::AccessForbidden(_) => StatusCode::FORBIDDEN,
            ApiError::RemovalFailed(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ApiError::InvalidIdentifier(_) => "InvalidIdentifier",
            ApiError::AccessForbidden(_) => "AccessForbidden",
            ApiError::RemovalFailed(_) => "RemovalFailed",
            ApiError::Internal(_) => "InternalError",
        }
    }
}

/// Wire shape of an error response
#[derive(Debug, Serialize)]
struct ErrorBody {
    status: u16,
    error: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            status: status.as_u16(),
            error: self.kind(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<RegistryError> for ApiError {
    fn from(err: RegistryError) -> Self {
        match err {
            // At the boundary, an unresolved UUID reads the same as a
            // malformed one
            RegistryError::NotFound { .. } => ApiError::InvalidIdentifier(err.to_string()),
            RegistryError::RemovalFailed { .. } => ApiError::RemovalFailed(err.to_string()),
            RegistryError::Backend(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<TypeError> for ApiError {
    fn from(err: TypeError) -> Self {
        ApiError::InvalidIdentifier(err.to_string())
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
