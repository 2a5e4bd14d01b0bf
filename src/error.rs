//! Error types for the library server

use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

/// Stable error codes carried in every error body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Failure = 1,
    NotAuthorized = 2,
    Forbidden = 3,
    DbFailure = 4,
    NotFound = 5,
    Duplicate = 6,
    HasDependents = 7,
    BadValue = 8,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Bad credentials, or no principal on a protected route
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Principal is known but lacks the required role
    #[error("Authorization failed: {0}")]
    Authorization(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    #[error("Has dependents: {0}")]
    HasDependents(String),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
    /// Field name to message, present on validation failures only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<BTreeMap<String, String>>,
}

impl AppError {
    /// Status and code this error is surfaced with at the HTTP boundary
    pub fn status(&self) -> (StatusCode, ErrorCode) {
        match self {
            AppError::Authentication(_) | AppError::InvalidToken(_) => {
                (StatusCode::UNAUTHORIZED, ErrorCode::NotAuthorized)
            }
            AppError::Authorization(_) => (StatusCode::FORBIDDEN, ErrorCode::Forbidden),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, ErrorCode::NotFound),
            AppError::DuplicateKey(_) => (StatusCode::CONFLICT, ErrorCode::Duplicate),
            AppError::HasDependents(_) => (StatusCode::CONFLICT, ErrorCode::HasDependents),
            AppError::Validation(_) | AppError::BadRequest(_) => {
                (StatusCode::BAD_REQUEST, ErrorCode::BadValue)
            }
            AppError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::DbFailure),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::Failure),
        }
    }
}

fn field_messages(errors: &ValidationErrors) -> BTreeMap<String, String> {
    errors
        .field_errors()
        .into_iter()
        .filter_map(|(field, errs)| {
            errs.first().map(|err| {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| err.code.to_string());
                (field.to_string(), message)
            })
        })
        .collect()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status();

        let (message, fields) = match &self {
            AppError::Authentication(msg)
            | AppError::InvalidToken(msg)
            | AppError::Authorization(msg)
            | AppError::NotFound(msg)
            | AppError::DuplicateKey(msg)
            | AppError::HasDependents(msg)
            | AppError::BadRequest(msg) => (msg.clone(), None),
            AppError::Validation(errors) => {
                ("Validation failed".to_string(), Some(field_messages(errors)))
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                ("An unexpected error occurred".to_string(), None)
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                ("An unexpected error occurred".to_string(), None)
            }
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
            fields,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Probe {
        #[validate(length(min = 1, message = "Name is required"))]
        name: String,
    }

    #[test]
    fn integrity_errors_map_to_client_outcomes() {
        assert_eq!(AppError::NotFound("x".into()).status().0, StatusCode::NOT_FOUND);
        assert_eq!(AppError::DuplicateKey("x".into()).status().0, StatusCode::CONFLICT);
        assert_eq!(AppError::HasDependents("x".into()).status().0, StatusCode::CONFLICT);
        assert_eq!(AppError::Authentication("x".into()).status().0, StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::InvalidToken("x".into()).status().0, StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Authorization("x".into()).status().0, StatusCode::FORBIDDEN);
    }

    #[test]
    fn validation_errors_carry_field_messages() {
        let errors = Probe { name: String::new() }.validate().unwrap_err();
        let fields = field_messages(&errors);
        assert_eq!(fields.get("name").map(String::as_str), Some("Name is required"));
    }

    #[tokio::test]
    async fn internal_errors_do_not_leak_details() {
        let response = AppError::Internal("connection string postgres://secret".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(!body.contains("secret"));
        assert!(body.contains("An unexpected error occurred"));
    }
}
