//! HTTP error mapping
//!
//! Every failure is rendered as a JSON body `{ error, message, details? }`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use fincafe_tenancy::TenancyError;
use serde::Serialize;
use thiserror::Error;
use fincafe_common::error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Unknown farm (404)
    #[error("{0}")]
    NotFound(String),

    /// Malformed farm code (400)
    #[error("{0}")]
    BadRequest(String),

    /// Farm exists but is disabled (403)
    #[error("{0}")]
    Forbidden(String),

    /// Farm database missing or unmigrated (503)
    #[error("{0}")]
    NotInitialized(String),

    /// Migration tool failed (500); diagnostics go to the client
    #[error("Failed to initialize farm database: {message}")]
    Migration {
        message: String,
        details: Option<serde_json::Value>,
    },

    /// Anything else (500)
    #[error("{0}")]
    Internal(String),
}

#[derive(Serialize, Debug)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            ApiError::Forbidden(_) => (StatusCode::FORBIDDEN, "forbidden"),
            ApiError::NotInitialized(_) => (StatusCode::SERVICE_UNAVAILABLE, "not_initialized"),
            ApiError::Migration { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "migration_failed"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };

        if status.is_server_error() {
            error!(error = %self, error_type = error_type, "Request error");
        }

        let message = self.to_string();
        let details = match self {
            ApiError::Migration { details, .. } => details,
            _ => None,
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
            details,
        };
        (status, Json(body)).into_response()
    }
}

impl From<TenancyError> for ApiError {
    fn from(err: TenancyError) -> Self {
        match err {
            TenancyError::FarmNotFound(_) => ApiError::NotFound(err.to_string()),
            TenancyError::FarmInactive(_) => ApiError::Forbidden(err.to_string()),
            TenancyError::InvalidCode(_) | TenancyError::InvalidDatabaseName(_) => {
                ApiError::BadRequest(err.to_string())
            }
            TenancyError::NotProvisioned { ref database, .. } => ApiError::NotInitialized(format!(
                "Farm database {database} needs initialization"
            )),
            TenancyError::Migration(ref e) => ApiError::Migration {
                message: e.to_string(),
                details: e
                    .diagnostics()
                    .and_then(|d| serde_json::to_value(d).ok()),
            },
            other => ApiError::Internal(other.to_string()),
        }
    }
}
