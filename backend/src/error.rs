//! Error handling for the retail stock service
//!
//! Every failure is rendered as `{ "error": { "code", "message", "field"? } }`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::StockError;
use thiserror::Error;

/// Postgres SQLSTATEs a caller can resolve by retrying
const UNIQUE_VIOLATION: &str = "23505";
const SERIALIZATION_FAILURE: &str = "40001";
const DEADLOCK_DETECTED: &str = "40P01";

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Business logic errors
    #[error("Insufficient stock: {0}")]
    InsufficientStock(String),

    /// A uniqueness race; the caller may retry
    #[error("Conflict: {message}")]
    Conflict { resource: String, message: String },

    // Storage errors
    #[error("Database error: {0}")]
    DatabaseError(sqlx::Error),

    #[error("Persistence error: {0}")]
    Persistence(String),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        AppError::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// Machine-readable code sent to clients
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation { .. } | AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::InsufficientStock(_) => "INSUFFICIENT_STOCK",
            AppError::Conflict { .. } => "CONFLICT",
            AppError::DatabaseError(_) => "DATABASE_ERROR",
            AppError::Persistence(_) => "PERSISTENCE_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. }
            | AppError::ValidationError(_)
            | AppError::InsufficientStock(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::DatabaseError(_)
            | AppError::Persistence(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            match db_err.code().as_deref() {
                Some(UNIQUE_VIOLATION) => {
                    let resource = db_err.constraint().unwrap_or("unique constraint").to_string();
                    return AppError::Conflict {
                        message: format!("Concurrent write violated {}; retry the request", resource),
                        resource,
                    };
                }
                Some(SERIALIZATION_FAILURE) | Some(DEADLOCK_DETECTED) => {
                    return AppError::Conflict {
                        resource: "inventory".to_string(),
                        message: "Concurrent stock update detected; retry the request".to_string(),
                    };
                }
                _ => {}
            }
        }
        AppError::DatabaseError(err)
    }
}

impl From<StockError> for AppError {
    fn from(err: StockError) -> Self {
        match err {
            StockError::SameLocation => AppError::validation("toLocationCode", err.to_string()),
            StockError::NonPositiveQuantity { field } => AppError::validation(field, err.to_string()),
            StockError::InsufficientStock { .. } => AppError::InsufficientStock(err.to_string()),
            StockError::QuantityOverflow { .. } => AppError::ValidationError(err.to_string()),
            StockError::InvariantViolation { .. } => AppError::Internal(err.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<&str> = errors.field_errors().keys().copied().collect();
        fields.sort_unstable();
        match fields.as_slice() {
            [field] => AppError::validation(field, errors.to_string()),
            _ => AppError::ValidationError(errors.to_string()),
        }
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::Validation { message, .. } => message.clone(),
            AppError::Conflict { message, .. } => message.clone(),
            AppError::NotFound(resource) => format!("{} not found", resource),
            AppError::ValidationError(msg) | AppError::InsufficientStock(msg) => msg.clone(),
            // Storage and internal details stay in the logs
            AppError::DatabaseError(_) | AppError::Persistence(_) => {
                "A storage error occurred".to_string()
            }
            AppError::Internal(_) => "An internal server error occurred".to_string(),
        };
        let field = match &self {
            AppError::Validation { field, .. } => Some(field.clone()),
            AppError::Conflict { resource, .. } => Some(resource.clone()),
            _ => None,
        };

        if status.is_server_error() {
            tracing::error!("Error: {:?}", self);
        } else {
            tracing::warn!("Request rejected: {}", self);
        }

        let body = ErrorResponse {
            error: ErrorDetail {
                code: self.code().to_string(),
                message,
                field,
            },
        };
        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
