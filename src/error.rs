//! Error types for the catalog server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::models::Book;

/// Stable numeric codes carried in every error body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Success = 0,
    Failure = 1,
    NoSuchData = 2,
    DanglingReference = 3,
    BadValue = 4,
    DeleteBlocked = 5,
    DbFailure = 6,
}

/// A single field-level constraint violation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Failure raised by a document store backend
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Dangling reference: {0}")]
    DanglingReference(String),

    #[error("Validation failed on {} field(s)", .0.len())]
    Validation(Vec<FieldError>),

    #[error("Cannot delete {entity}: {} book(s) still reference it", .blocking_books.len())]
    DeleteBlocked {
        entity: String,
        blocking_books: Vec<Book>,
    },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Validation(vec![FieldError::new(field, message)])
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<FieldError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                let field = field.to_string();
                errs.iter().map(move |e| {
                    // Struct-level checks report under "__all__"; their code names the field.
                    let name = if field == "__all__" {
                        e.code.to_string()
                    } else {
                        field.clone()
                    };
                    let message = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid value for {}", name));
                    FieldError::new(name, message)
                })
            })
            .collect();
        fields.sort_by(|a, b| a.field.cmp(&b.field));
        AppError::Validation(fields)
    }
}

/// Error response body
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldError>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub blocking_books: Vec<Book>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let (status, code, fields, blocking_books) = match self {
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, ErrorCode::NoSuchData, vec![], vec![]),
            AppError::DanglingReference(_) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorCode::DanglingReference,
                vec![],
                vec![],
            ),
            AppError::Validation(fields) => {
                (StatusCode::BAD_REQUEST, ErrorCode::BadValue, fields, vec![])
            }
            AppError::DeleteBlocked { blocking_books, .. } => (
                StatusCode::CONFLICT,
                ErrorCode::DeleteBlocked,
                vec![],
                blocking_books,
            ),
            AppError::Store(e) => {
                tracing::error!("Store error: {:?}", e);
                let body = Json(ErrorResponse {
                    code: ErrorCode::DbFailure as u32,
                    error: format!("{:?}", ErrorCode::DbFailure),
                    message: "Database error".to_string(),
                    fields: vec![],
                    blocking_books: vec![],
                });
                return (StatusCode::INTERNAL_SERVER_ERROR, body).into_response();
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                let body = Json(ErrorResponse {
                    code: ErrorCode::Failure as u32,
                    error: format!("{:?}", ErrorCode::Failure),
                    message: "Internal server error".to_string(),
                    fields: vec![],
                    blocking_books: vec![],
                });
                return (StatusCode::INTERNAL_SERVER_ERROR, body).into_response();
            }
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
            fields,
            blocking_books,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_counts_fields() {
        let err = AppError::Validation(vec![
            FieldError::new("title", "Title must not be empty"),
            FieldError::new("isbn", "ISBN must not be empty"),
        ]);
        assert_eq!(err.to_string(), "Validation failed on 2 field(s)");
    }

    #[test]
    fn test_status_mapping() {
        let resp = AppError::NotFound("Author x".into()).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = AppError::DanglingReference("Author x".into()).into_response();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let resp = AppError::DeleteBlocked {
            entity: "Genre g1".into(),
            blocking_books: vec![],
        }
        .into_response();
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        let resp = AppError::Store(StoreError::Backend("down".into())).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
